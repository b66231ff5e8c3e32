use std::{
    fmt::Debug,
    ops::Deref,
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    errors::ResolveError,
    injector::{Node, NodeId},
    resolver::{downcast, resolve_single},
    token::Token,
    types::Injectable,
};

/// Lazily resolved dependency
///
/// Captures the injector it was created from and resolves the token the first time it is
/// accessed. This is how two bindings depending on each other can both be constructed:
/// one side declares the other with [crate::Dependency::deferred].
///
/// Should only be accessed after the constructor which received it has returned.
///
/// ### Panics
///
/// [Deferred::get] and [Deref] panic if resolution fails. Use [Deferred::try_get] to handle errors.
/// Inside the DI context that only happens if:
/// - It is accessed while its own target is still being constructed
/// - The injector it was created from has been destroyed
pub struct Deferred<T: ?Sized + Injectable>(Arc<DeferredInner<T>>);

struct DeferredInner<T: ?Sized + Injectable> {
    token: Token<T>,
    node: Weak<Node>,
    node_id: NodeId,
    once: OnceLock<Arc<T>>,
}

impl<T: ?Sized + Injectable> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Deferred(self.0.clone())
    }
}

impl<T: ?Sized + Injectable> Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("token", &self.0.token.name())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl<T: ?Sized + Injectable> Deref for Deferred<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T: ?Sized + Injectable> Deferred<T> {
    pub(crate) fn new(node: Weak<Node>, node_id: NodeId, token: Token<T>) -> Self {
        Deferred(Arc::new(DeferredInner {
            token,
            node,
            node_id,
            once: OnceLock::new(),
        }))
    }

    /// Accesses the deferred dependency
    ///
    /// # Panics
    /// - When resolution fails, see [Deferred::try_get]
    pub fn get(&self) -> &Arc<T> {
        match self.try_get() {
            Ok(instance) => instance,
            Err(e) => panic!(
                "Deferred '{}' could not be resolved: {}",
                self.0.token.name(),
                e
            ),
        }
    }

    /// Try to access the deferred dependency
    ///
    /// Resolves on first success and keeps the instance afterwards. Failures are not remembered,
    /// a later call tries again.
    pub fn try_get(&self) -> Result<&Arc<T>, ResolveError> {
        if let Some(instance) = self.0.once.get() {
            return Ok(instance);
        }

        let node = self.0.node.upgrade().ok_or_else(|| {
            tracing::debug!("Deferred '{}' outlived its injector", self.0.token.name());
            ResolveError::Destroyed(self.0.node_id)
        })?;
        let instance = resolve_single(&node, self.0.token.info(), None)?;
        let resolved = downcast::<T>(&instance)?;

        // If another thread won the race its instance is the cached one anyway
        Ok(self.0.once.get_or_init(|| resolved))
    }

    /// Whether the dependency has been resolved already
    pub fn is_resolved(&self) -> bool {
        self.0.once.get().is_some()
    }

    pub fn token(&self) -> Token<T> {
        self.0.token
    }
}
