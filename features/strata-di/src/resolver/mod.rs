//! Resolution of tokens against the injector hierarchy
//!
//! Single tokens resolve to the binding nearest to the requesting injector. Multi tokens
//! aggregate the bindings of every injector from the root down to the requester.
//! Instances are cached per binding at the injector owning the binding, whatever its
//! scope. A [crate::Scope::Local] token gets one instance per injector binding it.

use std::{any::type_name, sync::Arc};

use crate::{
    binding::{Binding, Provider},
    errors::ResolveError,
    injector::Node,
    token::{Multiplicity, TokenInfo},
    types::{Injectable, Instance},
};

mod chain;
pub mod deferred;
pub mod dependencies;

use chain::InProgress;
use dependencies::Dependencies;

/// Resolves a single valued token starting at `requester`
pub(crate) fn resolve_single(
    requester: &Arc<Node>,
    token: TokenInfo,
    required_by: Option<TokenInfo>,
) -> Result<Instance, ResolveError> {
    requester.ensure_alive()?;
    if token.multiplicity != Multiplicity::Single {
        return Err(ResolveError::MultiplicityMismatch {
            token,
            expected: Multiplicity::Single,
        });
    }

    let Some((owner, binding)) = find_nearest(requester, token)? else {
        tracing::debug!(
            "No binding for '{}' on the path from injector {} to the root",
            token,
            requester.id
        );
        return Err(ResolveError::Unresolved { token, required_by });
    };

    materialize(&owner, &binding)
}

/// Resolves every binding of a multi token, root to leaf then registration order
pub(crate) fn resolve_multi(
    requester: &Arc<Node>,
    token: TokenInfo,
    required_by: Option<TokenInfo>,
    required: bool,
) -> Result<Vec<Instance>, ResolveError> {
    requester.ensure_alive()?;
    if token.multiplicity != Multiplicity::Multi {
        return Err(ResolveError::MultiplicityMismatch {
            token,
            expected: Multiplicity::Multi,
        });
    }

    let mut instances = Vec::new();
    for owner in path_from_root(requester)? {
        for binding in owner.local_bindings(token.id) {
            instances.push(materialize(&owner, &binding)?);
        }
    }

    if required && instances.is_empty() {
        return Err(ResolveError::Unresolved { token, required_by });
    }

    Ok(instances)
}

/// Whether resolving `token` from `requester` would be served from a cache
pub(crate) fn is_cached(requester: &Arc<Node>, token: TokenInfo) -> bool {
    if requester.ensure_alive().is_err() {
        return false;
    }

    match token.multiplicity {
        Multiplicity::Single => match find_nearest(requester, token) {
            Ok(Some((owner, binding))) => binding_is_cached(&owner, &binding),
            _ => false,
        },
        Multiplicity::Multi => {
            let Ok(path) = path_from_root(requester) else {
                return false;
            };
            let bindings: Vec<_> = path
                .iter()
                .flat_map(|owner| {
                    owner
                        .local_bindings(token.id)
                        .into_iter()
                        .map(move |binding| (owner, binding))
                })
                .collect();

            !bindings.is_empty()
                && bindings
                    .iter()
                    .all(|(owner, binding)| binding_is_cached(owner, binding))
        }
    }
}

fn binding_is_cached(owner: &Arc<Node>, binding: &Binding) -> bool {
    match binding.provider() {
        Provider::Value(_) | Provider::Alias(_) => false,
        Provider::Class(_) | Provider::Factory(_) => owner.cached(binding.id()).is_some(),
    }
}

pub(crate) fn downcast<T: ?Sized + Injectable>(
    instance: &Instance,
) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast::<T>()
        .map_err(|actual_type| ResolveError::DowncastFailed {
            required_type: type_name::<T>(),
            actual_type,
        })
}

/// Walks from `requester` to the root, the first injector with a binding wins
fn find_nearest(
    requester: &Arc<Node>,
    token: TokenInfo,
) -> Result<Option<(Arc<Node>, Arc<Binding>)>, ResolveError> {
    let mut current = Some(requester.clone());
    while let Some(node) = current {
        if let Some(binding) = node.nearest_local(token.id) {
            return Ok(Some((node, binding)));
        }
        current = node.parent()?;
    }
    Ok(None)
}

/// All injectors from the root down to `node`, inclusive
pub(crate) fn path_from_root(node: &Arc<Node>) -> Result<Vec<Arc<Node>>, ResolveError> {
    let mut path = vec![node.clone()];
    let mut current = node.parent()?;
    while let Some(parent) = current {
        current = parent.parent()?;
        path.push(parent);
    }
    path.reverse();
    Ok(path)
}

/// Produces the instance for a binding found at `owner`
///
/// `owner` holds the cache entry, and dependencies are resolved from it.
fn materialize(owner: &Arc<Node>, binding: &Arc<Binding>) -> Result<Instance, ResolveError> {
    let constructor = match binding.provider() {
        Provider::Value(instance) => return Ok(instance.clone()),
        Provider::Alias(target) => {
            // No cache entry of its own, the alias shares the target's instance
            let _in_progress = InProgress::enter(owner.id, binding)?;
            return resolve_single(owner, *target, Some(binding.token()));
        }
        Provider::Class(constructor) | Provider::Factory(constructor) => constructor,
    };

    if let Some(instance) = owner.cached(binding.id()) {
        tracing::trace!("Cache hit for '{}' at injector {}", binding.token(), owner.id);
        return Ok(instance);
    }

    let in_progress = InProgress::enter(owner.id, binding)?;

    let deps = Dependencies::resolve(owner, binding.token(), &constructor.dependencies)?;
    let instance = (constructor.construct)(&deps).map_err(|error| {
        tracing::debug!("Factory for '{}' failed: {}", binding.token(), error);
        ResolveError::FactoryFailed {
            token: binding.token(),
            error: Arc::new(error),
        }
    })?;

    drop(in_progress);
    tracing::debug!(
        "Constructed instance of '{}' ({}) at injector {}",
        binding.token(),
        instance.info.type_name,
        owner.id
    );

    Ok(owner.cache(binding.id(), instance))
}
