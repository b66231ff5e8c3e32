use std::cell::RefCell;

use crate::{
    binding::{Binding, BindingId},
    errors::ResolveError,
    injector::NodeId,
    token::TokenInfo,
};

thread_local! {
    /// Bindings currently under construction on this thread, outermost first
    static RESOLUTION_CHAIN: RefCell<Vec<ChainLink>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Copy)]
struct ChainLink {
    node: NodeId,
    binding: BindingId,
    token: TokenInfo,
}

/// Marks a binding as in progress on the current resolution chain
///
/// The mark is removed when the guard drops, including on errors and panics.
pub(super) struct InProgress {
    depth: usize,
}

impl InProgress {
    /// Fails with [ResolveError::Circular] if the binding is already in progress at `node`
    pub(super) fn enter(node: NodeId, binding: &Binding) -> Result<Self, ResolveError> {
        RESOLUTION_CHAIN.with(|chain| {
            let mut chain = chain.borrow_mut();

            let link = ChainLink {
                node,
                binding: binding.id(),
                token: binding.token(),
            };

            if let Some(start) = chain
                .iter()
                .position(|entry| entry.node == link.node && entry.binding == link.binding)
            {
                let mut cycle: Vec<TokenInfo> =
                    chain[start..].iter().map(|entry| entry.token).collect();
                cycle.push(link.token);

                let from = chain.last().map(|entry| entry.token).unwrap_or(link.token);
                tracing::debug!("Circular dependency detected while resolving '{}'", link.token);

                return Err(ResolveError::Circular {
                    from,
                    to: link.token,
                    chain: cycle,
                });
            }

            chain.push(link);
            Ok(InProgress { depth: chain.len() })
        })
    }
}

impl Drop for InProgress {
    fn drop(&mut self) {
        // The thread local may already be gone while the thread shuts down
        let _ = RESOLUTION_CHAIN.try_with(|chain| {
            chain.borrow_mut().truncate(self.depth - 1);
        });
    }
}
