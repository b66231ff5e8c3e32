use std::sync::Arc;

use thiserror::Error;

use crate::{
    injector::NodeId,
    token::{Multiplicity, TokenInfo},
    types::DynError,
};

/// Errors when adding bindings to an injector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// A single valued token is already bound at the same injector
    #[error("'{token}' is already bound at this injector - override it from a child injector instead")]
    Conflict { token: TokenInfo },
    /// Aliases must point at single valued tokens
    #[error("'{token}' cannot alias the multi token '{target}'")]
    AliasToMulti { token: TokenInfo, target: TokenInfo },
    /// An alias pointing at its own token would never resolve
    #[error("'{0}' cannot alias itself")]
    SelfAlias(TokenInfo),
    /// The injector was torn down
    #[error("Injector {0} has been destroyed")]
    Destroyed(NodeId),
}

/// Errors when resolving a token
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// No binding exists anywhere on the path to the root
    #[error("No binding found for '{token}'{}", required_by_suffix(.required_by))]
    Unresolved {
        token: TokenInfo,
        required_by: Option<TokenInfo>,
    },
    /// The token is already being constructed further up this resolution chain
    #[error(
        "A circular dependency exists between '{from}' and '{to}' through {} - consider a deferred dependency",
        format_chain(.chain)
    )]
    Circular {
        from: TokenInfo,
        to: TokenInfo,
        chain: Vec<TokenInfo>,
    },
    /// The user supplied constructor or factory returned an error
    #[error("Factory for '{token}' failed - error: {error}")]
    FactoryFailed {
        token: TokenInfo,
        error: Arc<DynError>,
    },
    /// `get` on a multi token, or `get_all` on a single one
    #[error("'{token}' is declared {:?} but was requested as {expected:?}", .token.multiplicity)]
    MultiplicityMismatch {
        token: TokenInfo,
        expected: Multiplicity,
    },
    /// A constructor reached for a token it never declared
    #[error("'{required_by}' accessed '{token}' without declaring it as a dependency")]
    UndeclaredDependency {
        token: TokenInfo,
        required_by: TokenInfo,
    },
    /// A deferred dependency has to be accessed through `Dependencies::deferred`
    #[error("'{required_by}' declared '{token}' as deferred, access it through `Dependencies::deferred`")]
    DeferredAccess {
        token: TokenInfo,
        required_by: TokenInfo,
    },
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// The injector, or one of its ancestors, was torn down
    #[error("Injector {0} has been destroyed")]
    Destroyed(NodeId),
}

impl ResolveError {
    /// The error a constructor or factory failed with, unchanged
    pub fn factory_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ResolveError::FactoryFailed { error, .. } => Some(&***error),
            _ => None,
        }
    }

    /// The token the error is about
    pub fn token(&self) -> Option<TokenInfo> {
        match self {
            ResolveError::Unresolved { token, .. }
            | ResolveError::FactoryFailed { token, .. }
            | ResolveError::MultiplicityMismatch { token, .. }
            | ResolveError::UndeclaredDependency { token, .. }
            | ResolveError::DeferredAccess { token, .. } => Some(*token),
            ResolveError::Circular { to, .. } => Some(*to),
            ResolveError::DowncastFailed { .. } | ResolveError::Destroyed(_) => None,
        }
    }
}

fn required_by_suffix(required_by: &Option<TokenInfo>) -> String {
    match required_by {
        Some(token) => format!(", required by '{token}'"),
        None => String::new(),
    }
}

pub(crate) fn format_chain(chain: &[TokenInfo]) -> String {
    chain
        .iter()
        .map(|token| token.name)
        .collect::<Vec<_>>()
        .join(" -> ")
}
