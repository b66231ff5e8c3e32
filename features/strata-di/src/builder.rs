use std::sync::Arc;

use crate::{
    binding::{Binding, Construct, Dependency},
    errors::RegisterError,
    injector::Injector,
    resolver::dependencies::Dependencies,
    token::Token,
    types::{DynError, Injectable},
};

/// Collects bindings, then creates a root or a child injector from them
///
/// ```rust
/// use strata_di::{Dependency, Injector, Token};
///
/// let greeting: Token<String> = Token::single("greeting");
/// let loud: Token<String> = Token::single("loud");
///
/// let root = Injector::builder()
///     .add_value(&greeting, "hello".to_string())
///     .add_factory(&loud, [Dependency::on(&greeting)], move |deps| {
///         Ok(deps.get(&greeting)?.to_uppercase())
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(*root.get(&loud).unwrap(), "HELLO");
/// ```
#[derive(Default)]
pub struct InjectorBuilder {
    bindings: Vec<Binding>,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        InjectorBuilder {
            bindings: Vec::new(),
        }
    }
}

impl InjectorBuilder {
    pub fn add(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn add_value<T: ?Sized + Injectable>(
        self,
        token: &Token<T>,
        value: impl Into<Arc<T>>,
    ) -> Self {
        self.add(Binding::value(token, value))
    }

    pub fn add_class<T: Construct>(self, token: &Token<T>) -> Self {
        self.add(Binding::class(token))
    }

    pub fn add_factory<T, R, F>(
        self,
        token: &Token<T>,
        dependencies: impl IntoIterator<Item = Dependency>,
        factory: F,
    ) -> Self
    where
        T: ?Sized + Injectable,
        R: Into<Arc<T>>,
        F: Fn(&Dependencies) -> Result<R, DynError> + Send + Sync + 'static,
    {
        self.add(Binding::factory(token, dependencies, factory))
    }

    pub fn add_alias<T: ?Sized + Injectable>(self, token: &Token<T>, target: &Token<T>) -> Self {
        self.add(Binding::alias(token, target))
    }

    /// Number of bindings collected so far
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Creates a root injector
    pub fn build(self) -> Result<Injector, RegisterError> {
        Injector::root_with(self.bindings)
    }

    /// Creates a child injector below `parent`
    pub fn build_child(self, parent: &Injector) -> Result<Injector, RegisterError> {
        parent.create_child(self.bindings)
    }
}
