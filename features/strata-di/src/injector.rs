use std::{
    collections::HashMap,
    fmt::{self, Debug},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Weak,
    },
};

use parking_lot::Mutex;

use crate::{
    binding::{Binding, BindingId},
    builder::InjectorBuilder,
    dependency_graph::{DependencyGraph, DependencyGraphErrors},
    errors::{RegisterError, ResolveError},
    registry::Registry,
    resolver::{self, deferred::Deferred},
    token::{Scope, Token, TokenId},
    types::{Injectable, Instance},
};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process unique identity of an injector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One level of the scope hierarchy
///
/// The hierarchy is owned top down: a node owns its children and only holds a weak
/// reference to its parent.
pub(crate) struct Node {
    pub(crate) id: NodeId,
    parent: Option<(NodeId, Weak<Node>)>,
    children: Mutex<Vec<Arc<Node>>>,
    state: Mutex<NodeState>,
    destroyed: AtomicBool,
}

#[derive(Default)]
struct NodeState {
    registry: Registry,
    cache: HashMap<BindingId, Instance>,
}

impl Node {
    fn new(parent: Option<&Arc<Node>>, registry: Registry) -> Arc<Node> {
        Arc::new(Node {
            id: NodeId::next(),
            parent: parent.map(|parent| (parent.id, Arc::downgrade(parent))),
            children: Mutex::new(Vec::new()),
            state: Mutex::new(NodeState {
                registry,
                cache: HashMap::new(),
            }),
            destroyed: AtomicBool::new(false),
        })
    }

    pub(crate) fn ensure_alive(&self) -> Result<(), ResolveError> {
        match self.destroyed.load(Ordering::Acquire) {
            true => Err(ResolveError::Destroyed(self.id)),
            false => Ok(()),
        }
    }

    /// The parent node, `None` for the root
    ///
    /// Fails if the parent has been destroyed or dropped.
    pub(crate) fn parent(&self) -> Result<Option<Arc<Node>>, ResolveError> {
        let Some((parent_id, parent)) = &self.parent else {
            return Ok(None);
        };

        let parent = parent.upgrade().ok_or(ResolveError::Destroyed(*parent_id))?;
        parent.ensure_alive()?;
        Ok(Some(parent))
    }

    fn register(&self, binding: Binding) -> Result<(), RegisterError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(RegisterError::Destroyed(self.id));
        }

        warn_root_scope_below_root(self.parent.is_some(), &binding);
        let registered = self.state.lock().registry.register(self.id, binding);

        // The lock is released here, so the drop code of a rejected value may use injectors
        match registered {
            Ok(_) => Ok(()),
            Err((error, rejected)) => {
                drop(rejected);
                Err(error)
            }
        }
    }

    fn upgrade_parent(&self) -> Option<Arc<Node>> {
        self.parent.as_ref().and_then(|(_, parent)| parent.upgrade())
    }

    pub(crate) fn local_bindings(&self, token: TokenId) -> Vec<Arc<Binding>> {
        self.state.lock().registry.lookup_local(token).to_vec()
    }

    pub(crate) fn all_bindings(&self) -> Vec<Arc<Binding>> {
        self.state.lock().registry.all()
    }

    /// The effective binding of a single token at this node
    pub(crate) fn nearest_local(&self, token: TokenId) -> Option<Arc<Binding>> {
        self.state.lock().registry.lookup_local(token).first().cloned()
    }

    pub(crate) fn cached(&self, binding: BindingId) -> Option<Instance> {
        self.state.lock().cache.get(&binding).cloned()
    }

    /// Caches a freshly built instance
    ///
    /// If another thread got there first its instance is kept and returned instead.
    pub(crate) fn cache(&self, binding: BindingId, instance: Instance) -> Instance {
        if self.destroyed.load(Ordering::Acquire) {
            return instance;
        }

        let existing = {
            let mut state = self.state.lock();
            match state.cache.get(&binding) {
                Some(existing) => Some(existing.clone()),
                None => {
                    state.cache.insert(binding, instance.clone());
                    None
                }
            }
        };

        match existing {
            // The losing instance is dropped outside the lock
            Some(existing) => existing,
            None => instance,
        }
    }

    /// Marks this node and all descendants destroyed and releases their state
    fn teardown(&self) {
        self.destroyed.store(true, Ordering::Release);

        let children = std::mem::take(&mut *self.children.lock());
        for child in &children {
            child.teardown();
        }

        // Instances are dropped after the lock is released, their drop code may use injectors
        let (registry, released) = {
            let mut state = self.state.lock();
            (
                std::mem::take(&mut state.registry),
                std::mem::take(&mut state.cache),
            )
        };
        tracing::debug!(
            "Destroyed injector {} releasing {} cached instances",
            self.id,
            released.len()
        );
        drop(registry);
        drop(released);
    }
}

fn warn_root_scope_below_root(has_parent: bool, binding: &Binding) {
    if has_parent && binding.scope() == Scope::Root {
        tracing::warn!(
            "'{}' is root scoped but bound below the root injector, it will be cached at its owning injector",
            binding.token()
        );
    }
}

/// Handle to one level of the injector hierarchy
///
/// Cloning is cheap and yields a handle to the same injector. A child injector is owned
/// by its parent: dropping every handle to it does not detach it, [Injector::destroy] does.
///
/// ```rust
/// use std::sync::Arc;
/// use strata_di::{Binding, Injector, Scope, Token};
///
/// let config: Token<String> = Token::single("config");
/// let view_state: Token<Vec<u32>> = Token::single("view_state");
///
/// let root = Injector::root_with([Binding::value(&config, "prod".to_string())]).unwrap();
/// let view = || {
///     Binding::factory(&view_state, [], |_| Ok(Vec::<u32>::new())).in_scope(Scope::Local)
/// };
///
/// let left = root.create_child([view()]).unwrap();
/// let right = root.create_child([view()]).unwrap();
///
/// assert!(Arc::ptr_eq(&left.get(&config).unwrap(), &right.get(&config).unwrap()));
/// assert!(!Arc::ptr_eq(&left.get(&view_state).unwrap(), &right.get(&view_state).unwrap()));
/// ```
#[derive(Clone)]
pub struct Injector {
    node: Arc<Node>,
}

impl Injector {
    /// Creates an empty root injector
    pub fn root() -> Self {
        Injector {
            node: Node::new(None, Registry::default()),
        }
    }

    /// Creates a root injector holding the given bindings
    pub fn root_with(bindings: impl IntoIterator<Item = Binding>) -> Result<Self, RegisterError> {
        let root = Self::root();
        for binding in bindings {
            root.node.register(binding)?;
        }
        Ok(root)
    }

    /// Chained way of collecting bindings before creating an injector
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    /// Creates a child injector holding the given bindings
    ///
    /// Either all bindings are registered, or no child is created. The child stays attached
    /// until [Injector::destroy] is called on it or on one of its ancestors.
    pub fn create_child(
        &self,
        bindings: impl IntoIterator<Item = Binding>,
    ) -> Result<Injector, RegisterError> {
        if self.node.destroyed.load(Ordering::Acquire) {
            return Err(RegisterError::Destroyed(self.node.id));
        }

        // The child is only attached once every binding registered
        let child = Node::new(Some(&self.node), Registry::default());
        for binding in bindings {
            child.register(binding)?;
        }
        self.node.children.lock().push(child.clone());

        tracing::debug!(
            "Created injector {} below {} with {} bindings",
            child.id,
            self.node.id,
            child.state.lock().registry.len()
        );

        Ok(Injector { node: child })
    }

    /// Adds a binding to this injector
    ///
    /// Fails if a single valued token is already bound at this same injector.
    /// Binding it again in a child injector is allowed and shadows this one.
    pub fn register(&self, binding: Binding) -> Result<(), RegisterError> {
        self.node.register(binding)
    }

    /// Bindings of `token` registered at this injector, ancestors are not consulted
    pub fn lookup_local<T: ?Sized>(&self, token: &Token<T>) -> Vec<Arc<Binding>> {
        self.node.local_bindings(token.id())
    }

    /// Resolves a single valued token
    pub fn get<T: ?Sized + Injectable>(&self, token: &Token<T>) -> Result<Arc<T>, ResolveError> {
        let instance = resolver::resolve_single(&self.node, token.info(), None)?;
        resolver::downcast(&instance)
    }

    /// Resolves a single valued token, `None` if it is not bound anywhere
    pub fn get_optional<T: ?Sized + Injectable>(
        &self,
        token: &Token<T>,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        match self.get(token) {
            Ok(instance) => Ok(Some(instance)),
            Err(ResolveError::Unresolved {
                token: missing,
                required_by: None,
            }) if missing == token.info() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolves every binding of a multi token from the root down to this injector
    ///
    /// Ordered root to leaf, then by registration. No bindings is not an error.
    pub fn get_all<T: ?Sized + Injectable>(
        &self,
        token: &Token<T>,
    ) -> Result<Vec<Arc<T>>, ResolveError> {
        resolver::resolve_multi(&self.node, token.info(), None, false)?
            .iter()
            .map(resolver::downcast)
            .collect()
    }

    /// Like [Injector::get_all], but fails if nothing is bound
    pub fn get_all_required<T: ?Sized + Injectable>(
        &self,
        token: &Token<T>,
    ) -> Result<Vec<Arc<T>>, ResolveError> {
        resolver::resolve_multi(&self.node, token.info(), None, true)?
            .iter()
            .map(resolver::downcast)
            .collect()
    }

    /// A handle which resolves `token` from this injector once it is first accessed
    pub fn defer<T: ?Sized + Injectable>(&self, token: &Token<T>) -> Deferred<T> {
        Deferred::new(Arc::downgrade(&self.node), self.node.id, *token)
    }

    /// Statically checks every binding visible from this injector
    ///
    /// Reports all missing and circular dependencies at once.
    pub fn validate(&self) -> Result<(), DependencyGraphErrors> {
        DependencyGraph::new(&self.node)?.check()
    }

    /// Tears down this injector and all of its descendants
    ///
    /// Detaches it from its parent. Ancestors and siblings are not affected.
    /// Resolving through a destroyed injector fails.
    pub fn destroy(&self) {
        if let Some(parent) = self.node.upgrade_parent() {
            parent
                .children
                .lock()
                .retain(|child| !Arc::ptr_eq(child, &self.node));
        }
        self.node.teardown();
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn parent(&self) -> Option<Injector> {
        self.node.upgrade_parent().map(|node| Injector { node })
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn is_destroyed(&self) -> bool {
        self.node.destroyed.load(Ordering::Acquire)
    }

    pub fn children_len(&self) -> usize {
        self.node.children.lock().len()
    }

    /// Number of instances cached at this injector
    pub fn cached_len(&self) -> usize {
        self.node.state.lock().cache.len()
    }

    /// Whether resolving `token` from here would be answered from a cache
    ///
    /// Values and aliases never have cache entries of their own.
    pub fn is_cached<T: ?Sized>(&self, token: &Token<T>) -> bool {
        resolver::is_cached(&self.node, token.info())
    }
}

impl Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (bindings, cached) = {
            let state = self.node.state.lock();
            (state.registry.len(), state.cache.len())
        };

        f.debug_struct("Injector")
            .field("id", &self.node.id)
            .field("root", &self.is_root())
            .field("bindings", &bindings)
            .field("cached", &cached)
            .field("children", &self.children_len())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
