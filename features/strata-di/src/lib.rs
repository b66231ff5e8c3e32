//! Strata DI is a hierarchical dependency injector.
//!
//! Values are requested through typed [Token]s and produced by [Binding]s registered at an
//! [Injector]. Injectors form a tree: a child sees everything its ancestors provide and may
//! shadow it with its own bindings.
//!
//! Strata DI is split into the following parts:
//! 1. Tokens - typed identifiers, single or multi valued, carrying a default [Scope]
//! 2. Bindings - values, classes implementing [Construct], factories and aliases
//! 3. Injector - the tree of registries and instance caches
//! 4. Resolver - walking the tree, caching, [Deferred] references and cycle detection
//! 5. Dependency graph - static validation of everything bound, see [Injector::validate]
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_di::{Binding, Dependency, Injector, Token};
//!
//! trait Interceptor: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct Auth;
//! impl Interceptor for Auth {
//!     fn name(&self) -> &'static str {
//!         "auth"
//!     }
//! }
//!
//! struct Retry;
//! impl Interceptor for Retry {
//!     fn name(&self) -> &'static str {
//!         "retry"
//!     }
//! }
//!
//! let interceptors: Token<dyn Interceptor> = Token::multi("interceptors");
//! let chain: Token<Vec<&'static str>> = Token::single("chain");
//!
//! let root = Injector::root_with([
//!     Binding::value(&interceptors, Arc::new(Auth) as Arc<dyn Interceptor>),
//!     Binding::factory(&chain, [Dependency::on(&interceptors)], move |deps| {
//!         Ok(deps.all(&interceptors)?.iter().map(|i| i.name()).collect::<Vec<_>>())
//!     }),
//! ])
//! .unwrap();
//!
//! let child = root
//!     .create_child([Binding::value(&interceptors, Arc::new(Retry) as Arc<dyn Interceptor>)])
//!     .unwrap();
//!
//! let names: Vec<_> = child.get_all(&interceptors).unwrap().iter().map(|i| i.name()).collect();
//! assert_eq!(names, vec!["auth", "retry"]);
//!
//! // The chain is owned by the root, so it only sees what the root provides
//! assert_eq!(*child.get(&chain).unwrap(), vec!["auth"]);
//! ```

pub mod binding;
pub mod builder;
pub mod dependency_graph;
pub mod errors;
pub mod injector;
mod registry;
pub mod resolver;
pub mod token;
pub mod types;

pub use binding::{Binding, BindingId, BindingKind, Construct, Dependency};
pub use builder::InjectorBuilder;
pub use dependency_graph::{DependencyGraphError, DependencyGraphErrors};
pub use errors::{RegisterError, ResolveError};
pub use injector::{Injector, NodeId};
pub use resolver::{deferred::Deferred, dependencies::Dependencies};
pub use token::{Multiplicity, Scope, Token, TokenId, TokenInfo};
pub use types::{DynError, Injectable};

#[cfg(test)]
mod tests;
