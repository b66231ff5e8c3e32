use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    resolver::dependencies::Dependencies,
    token::{Scope, Token, TokenInfo},
    types::{DynError, Injectable, Instance},
};

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

/// Process unique identity of a binding
///
/// Multi tokens share one token between many bindings, so instances are cached per binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    fn next() -> Self {
        BindingId(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A type which knows how to construct itself from injected dependencies
///
/// Bound to a token with [Binding::class].
///
/// ```rust
/// use std::sync::Arc;
/// use once_cell::sync::Lazy;
/// use strata_di::{Binding, Construct, Dependencies, Dependency, DynError, Injector, Token};
///
/// static NAME: Lazy<Token<String>> = Lazy::new(|| Token::single("name"));
/// static GREETER: Lazy<Token<Greeter>> = Lazy::new(|| Token::single("greeter"));
///
/// struct Greeter {
///     name: Arc<String>,
/// }
///
/// impl Construct for Greeter {
///     fn dependencies() -> Vec<Dependency> {
///         vec![Dependency::on(&NAME)]
///     }
///
///     fn construct(deps: &Dependencies) -> Result<Self, DynError> {
///         Ok(Greeter { name: deps.get(&NAME)? })
///     }
/// }
///
/// let root = Injector::root_with([
///     Binding::value(&NAME, "world".to_string()),
///     Binding::class(&GREETER),
/// ])
/// .unwrap();
/// assert_eq!(*root.get(&GREETER).unwrap().name, "world");
/// ```
pub trait Construct: Injectable + Sized {
    /// Tokens which have to be resolved before [Construct::construct] is called
    fn dependencies() -> Vec<Dependency>;

    /// Constructs a new instance from its resolved dependencies
    fn construct(deps: &Dependencies) -> Result<Self, DynError>;
}

/// A dependency declared by a class or factory binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// The required token
    pub token: TokenInfo,
    /// If a missing binding is acceptable
    pub optional: bool,
    /// If the dependency is handed over as a [crate::Deferred] instead of being resolved upfront
    pub lazy: bool,
}

impl Dependency {
    /// Required dependency, resolved before construction
    ///
    /// For multi tokens at least one binding has to exist.
    pub fn on<T: ?Sized>(token: &Token<T>) -> Self {
        Dependency {
            token: token.info(),
            optional: false,
            lazy: false,
        }
    }

    /// Dependency which may be missing
    pub fn optional<T: ?Sized>(token: &Token<T>) -> Self {
        Dependency {
            optional: true,
            ..Self::on(token)
        }
    }

    /// Dependency resolved on first access, breaks construction cycles
    pub fn deferred<T: ?Sized>(token: &Token<T>) -> Self {
        Dependency {
            lazy: true,
            ..Self::on(token)
        }
    }
}

pub(crate) type ConstructFn =
    Arc<dyn Fn(&Dependencies) -> Result<Instance, DynError> + Send + Sync + 'static>;

/// Callable plus the dependencies it wants resolved
#[derive(Clone)]
pub(crate) struct Constructor {
    pub dependencies: Vec<Dependency>,
    pub construct: ConstructFn,
}

#[derive(Clone)]
pub(crate) enum Provider {
    Value(Instance),
    Class(Constructor),
    Factory(Constructor),
    Alias(TokenInfo),
}

/// Which kind of provider a binding uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Value,
    Class,
    Factory,
    Alias,
}

/// Rule describing how to produce a value for a token
///
/// Multiplicity is taken over from the token. Bindings are immutable once created.
#[derive(Clone)]
pub struct Binding {
    id: BindingId,
    token: TokenInfo,
    scope: Scope,
    provider: Provider,
}

impl Binding {
    fn new(token: TokenInfo, provider: Provider) -> Self {
        Binding {
            id: BindingId::next(),
            token,
            scope: token.scope,
            provider,
        }
    }

    /// Binds an existing value
    pub fn value<T: ?Sized + Injectable>(token: &Token<T>, value: impl Into<Arc<T>>) -> Self {
        Self::new(token.info(), Provider::Value(Instance::new(value.into())))
    }

    /// Binds a type constructing itself through [Construct]
    pub fn class<T: Construct>(token: &Token<T>) -> Self {
        let construct: ConstructFn = Arc::new(|deps: &Dependencies| {
            T::construct(deps).map(|instance| Instance::new(Arc::new(instance)))
        });

        Self::new(
            token.info(),
            Provider::Class(Constructor {
                dependencies: T::dependencies(),
                construct,
            }),
        )
    }

    /// Binds a factory function which receives the declared dependencies
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use strata_di::{Binding, Dependency, Injector, Token};
    ///
    /// let port: Token<u16> = Token::single("port");
    /// let address: Token<String> = Token::single("address");
    ///
    /// let root = Injector::root_with([
    ///     Binding::value(&port, 8080u16),
    ///     Binding::factory(&address, [Dependency::on(&port)], move |deps| {
    ///         Ok(format!("127.0.0.1:{}", deps.get(&port)?))
    ///     }),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(*root.get(&address).unwrap(), "127.0.0.1:8080");
    /// ```
    pub fn factory<T, R, F>(
        token: &Token<T>,
        dependencies: impl IntoIterator<Item = Dependency>,
        factory: F,
    ) -> Self
    where
        T: ?Sized + Injectable,
        R: Into<Arc<T>>,
        F: Fn(&Dependencies) -> Result<R, DynError> + Send + Sync + 'static,
    {
        let construct: ConstructFn = Arc::new(move |deps: &Dependencies| {
            factory(deps).map(|instance| Instance::new::<T>(instance.into()))
        });

        Self::new(
            token.info(),
            Provider::Factory(Constructor {
                dependencies: dependencies.into_iter().collect(),
                construct,
            }),
        )
    }

    /// Resolves `token` to the very same instance `target` resolves to
    pub fn alias<T: ?Sized + Injectable>(token: &Token<T>, target: &Token<T>) -> Self {
        Self::new(token.info(), Provider::Alias(target.info()))
    }

    /// Overrides the scope taken over from the token
    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn token(&self) -> TokenInfo {
        self.token
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_multi(&self) -> bool {
        self.token.is_multi()
    }

    pub fn kind(&self) -> BindingKind {
        match self.provider {
            Provider::Value(_) => BindingKind::Value,
            Provider::Class(_) => BindingKind::Class,
            Provider::Factory(_) => BindingKind::Factory,
            Provider::Alias(_) => BindingKind::Alias,
        }
    }

    /// Declared dependencies, an alias depends on its target
    pub fn dependencies(&self) -> Vec<Dependency> {
        match &self.provider {
            Provider::Value(_) => Vec::new(),
            Provider::Class(constructor) | Provider::Factory(constructor) => {
                constructor.dependencies.clone()
            }
            Provider::Alias(target) => vec![Dependency {
                token: *target,
                optional: false,
                lazy: false,
            }],
        }
    }

    pub(crate) fn provider(&self) -> &Provider {
        &self.provider
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("token", &self.token.name)
            .field("scope", &self.scope)
            .field("kind", &self.kind())
            .finish()
    }
}
