use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::types::{Injectable, TypeInfo};

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Process unique identity of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u64);

/// Where the singleton instance of a binding lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Meant to be bound once at the root and shared by the whole hierarchy
    Root,
    /// Cached at the injector that owns the binding
    #[default]
    Module,
    /// Meant to be bound in each child scope, every injector binding it caches its own
    Local,
}

/// Whether a token resolves to one instance or aggregates many
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    Single,
    Multi,
}

/// Untyped description of a token
///
/// Equality and hashing only look at the id, two tokens sharing a name are still different tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub id: TokenId,
    pub name: &'static str,
    pub multiplicity: Multiplicity,
    pub scope: Scope,
    pub type_info: TypeInfo,
}
impl PartialEq for TokenInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for TokenInfo {}
impl Hash for TokenInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
impl TokenInfo {
    pub fn is_multi(&self) -> bool {
        self.multiplicity == Multiplicity::Multi
    }
}

/// Identifier for something injectable, resolving to an `Arc<T>`
///
/// Tokens are created once and never change. They are `Copy`, so pass them around freely.
///
/// ```rust
/// use strata_di::{Multiplicity, Scope, Token};
///
/// let api_url: Token<String> = Token::single("api_url");
/// let plugins: Token<dyn Fn() + Send + Sync> = Token::multi("plugins");
/// let per_view: Token<Vec<u32>> = Token::define("per_view", Multiplicity::Single, Scope::Local);
///
/// assert_ne!(api_url.id(), Token::<String>::single("api_url").id());
/// assert!(plugins.info().is_multi());
/// assert_eq!(per_view.scope(), Scope::Local);
/// ```
pub struct Token<T: ?Sized> {
    info: TokenInfo,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Injectable> Token<T> {
    /// Declares a new token
    pub fn define(name: &'static str, multiplicity: Multiplicity, scope: Scope) -> Self {
        Token {
            info: TokenInfo {
                id: TokenId(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed)),
                name,
                multiplicity,
                scope,
                type_info: TypeInfo::of::<T>(),
            },
            _marker: PhantomData,
        }
    }

    /// Single valued token cached at the injector owning its binding
    pub fn single(name: &'static str) -> Self {
        Self::define(name, Multiplicity::Single, Scope::Module)
    }

    /// Multi valued token, every binding on the path from the root is aggregated
    pub fn multi(name: &'static str) -> Self {
        Self::define(name, Multiplicity::Multi, Scope::Module)
    }
}

impl<T: ?Sized> Token<T> {
    pub fn id(&self) -> TokenId {
        self.info.id
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn scope(&self) -> Scope {
        self.info.scope
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.info.multiplicity
    }

    pub fn info(&self) -> TokenInfo {
        self.info
    }
}

impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: ?Sized> Copy for Token<T> {}

impl<T: ?Sized> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
    }
}
impl<T: ?Sized> Eq for Token<T> {}
impl<T: ?Sized> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.info.name)
            .field("id", &self.info.id.0)
            .field("multiplicity", &self.info.multiplicity)
            .field("scope", &self.info.scope)
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.info, f)
    }
}
