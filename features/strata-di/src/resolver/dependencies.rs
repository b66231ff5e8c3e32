use std::sync::{Arc, Weak};

use crate::{
    binding::Dependency,
    errors::ResolveError,
    injector::{Node, NodeId},
    resolver::{deferred::Deferred, downcast, resolve_multi, resolve_single},
    token::{Multiplicity, Token, TokenInfo},
    types::{Injectable, Instance},
};

enum Resolved {
    One(Instance),
    Many(Vec<Instance>),
    Missing,
    Deferred,
}

/// The declared dependencies of a binding, resolved and ready to be handed to its constructor
///
/// Only tokens listed in the binding's dependency list can be accessed.
pub struct Dependencies {
    required_by: TokenInfo,
    node: Weak<Node>,
    node_id: NodeId,
    resolved: Vec<(Dependency, Resolved)>,
}

impl Dependencies {
    /// Resolves every declared dependency from `node`, deferred ones are left for later
    pub(crate) fn resolve(
        node: &Arc<Node>,
        required_by: TokenInfo,
        declared: &[Dependency],
    ) -> Result<Self, ResolveError> {
        let mut resolved = Vec::with_capacity(declared.len());

        for dependency in declared {
            let token = dependency.token;
            let value = if dependency.lazy {
                if token.is_multi() {
                    // A deferred handle resolves exactly one instance
                    return Err(ResolveError::MultiplicityMismatch {
                        token,
                        expected: Multiplicity::Single,
                    });
                }
                Resolved::Deferred
            } else {
                match token.multiplicity {
                    Multiplicity::Multi => Resolved::Many(resolve_multi(
                        node,
                        token,
                        Some(required_by),
                        !dependency.optional,
                    )?),
                    Multiplicity::Single => match resolve_single(node, token, Some(required_by)) {
                        Ok(instance) => Resolved::One(instance),
                        // Only a missing binding for this very token is optional,
                        // a missing transitive one still fails
                        Err(ResolveError::Unresolved { token: missing, .. })
                            if dependency.optional && missing == token =>
                        {
                            Resolved::Missing
                        }
                        Err(e) => return Err(e),
                    },
                }
            };

            resolved.push((*dependency, value));
        }

        Ok(Dependencies {
            required_by,
            node: Arc::downgrade(node),
            node_id: node.id,
            resolved,
        })
    }

    fn lookup(&self, token: TokenInfo) -> Result<&Resolved, ResolveError> {
        self.resolved
            .iter()
            .find(|(dependency, _)| dependency.token == token)
            .map(|(_, resolved)| resolved)
            .ok_or(ResolveError::UndeclaredDependency {
                token,
                required_by: self.required_by,
            })
    }

    /// A required single valued dependency
    pub fn get<T: ?Sized + Injectable>(&self, token: &Token<T>) -> Result<Arc<T>, ResolveError> {
        match self.optional(token)? {
            Some(instance) => Ok(instance),
            None => Err(ResolveError::Unresolved {
                token: token.info(),
                required_by: Some(self.required_by),
            }),
        }
    }

    /// A single valued dependency declared with [Dependency::optional]
    pub fn optional<T: ?Sized + Injectable>(
        &self,
        token: &Token<T>,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        match self.lookup(token.info())? {
            Resolved::One(instance) => downcast(instance).map(Some),
            Resolved::Missing => Ok(None),
            Resolved::Many(_) => Err(ResolveError::MultiplicityMismatch {
                token: token.info(),
                expected: Multiplicity::Single,
            }),
            Resolved::Deferred => Err(ResolveError::DeferredAccess {
                token: token.info(),
                required_by: self.required_by,
            }),
        }
    }

    /// All instances of a multi token dependency, root to leaf
    pub fn all<T: ?Sized + Injectable>(
        &self,
        token: &Token<T>,
    ) -> Result<Vec<Arc<T>>, ResolveError> {
        match self.lookup(token.info())? {
            Resolved::Many(instances) => instances.iter().map(downcast).collect(),
            Resolved::One(_) | Resolved::Missing => Err(ResolveError::MultiplicityMismatch {
                token: token.info(),
                expected: Multiplicity::Multi,
            }),
            Resolved::Deferred => Err(ResolveError::DeferredAccess {
                token: token.info(),
                required_by: self.required_by,
            }),
        }
    }

    /// A handle resolving the dependency on first access
    ///
    /// Must not be dereferenced before the constructor receiving it has returned.
    pub fn deferred<T: ?Sized + Injectable>(
        &self,
        token: &Token<T>,
    ) -> Result<Deferred<T>, ResolveError> {
        self.lookup(token.info())?;
        Ok(Deferred::new(self.node.clone(), self.node_id, *token))
    }

    /// The token these dependencies are resolved for
    pub fn required_by(&self) -> TokenInfo {
        self.required_by
    }
}
