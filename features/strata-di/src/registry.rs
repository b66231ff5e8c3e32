use std::{collections::HashMap, sync::Arc};

use crate::{
    binding::{Binding, Provider},
    errors::RegisterError,
    injector::NodeId,
    token::{Multiplicity, TokenId},
};

/// Bindings registered at a single injector, in registration order per token
#[derive(Default)]
pub(crate) struct Registry {
    bindings: HashMap<TokenId, Vec<Arc<Binding>>>,
    len: usize,
}

impl Registry {
    /// Adds a binding
    ///
    /// A single valued token may only be bound once per registry. A rejected binding is
    /// handed back so the caller can drop it after releasing its locks.
    pub fn register(
        &mut self,
        node: NodeId,
        binding: Binding,
    ) -> Result<Arc<Binding>, (RegisterError, Binding)> {
        if let Err(error) = self.check(node, &binding) {
            return Err((error, binding));
        }

        let binding = Arc::new(binding);
        let entry = self.bindings.entry(binding.token().id).or_default();
        entry.push(binding.clone());
        self.len += 1;

        Ok(binding)
    }

    fn check(&self, node: NodeId, binding: &Binding) -> Result<(), RegisterError> {
        let token = binding.token();

        if let Provider::Alias(target) = binding.provider() {
            if *target == token {
                return Err(RegisterError::SelfAlias(token));
            }
            if target.is_multi() {
                return Err(RegisterError::AliasToMulti {
                    token,
                    target: *target,
                });
            }
        }

        if token.multiplicity == Multiplicity::Single && !self.lookup_local(token.id).is_empty() {
            tracing::debug!("Rejected second binding for '{}' at injector {}", token, node);
            return Err(RegisterError::Conflict { token });
        }

        Ok(())
    }

    /// Bindings for a token at this registry only, ancestors are not consulted
    pub fn lookup_local(&self, token: TokenId) -> &[Arc<Binding>] {
        self.bindings
            .get(&token)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every binding in registration order
    pub fn all(&self) -> Vec<Arc<Binding>> {
        let mut all: Vec<_> = self.bindings.values().flatten().cloned().collect();
        all.sort_by_key(|binding| binding.id());
        all
    }

    pub fn len(&self) -> usize {
        self.len
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn node() -> NodeId {
        NodeId::next()
    }

    #[test]
    fn second_single_binding_conflicts() {
        let token: Token<u32> = Token::single("answer");
        let mut registry = Registry::default();

        registry.register(node(), Binding::value(&token, 1u32)).unwrap();
        let (err, rejected) = registry
            .register(node(), Binding::value(&token, 2u32))
            .unwrap_err();

        assert_eq!(err, RegisterError::Conflict { token: token.info() });
        assert_eq!(rejected.token(), token.info());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn multi_bindings_keep_registration_order() {
        let token: Token<&'static str> = Token::multi("names");
        let mut registry = Registry::default();

        let first = registry.register(node(), Binding::value(&token, "a")).unwrap();
        let second = registry.register(node(), Binding::value(&token, "b")).unwrap();

        let local: Vec<_> = registry
            .lookup_local(token.id())
            .iter()
            .map(|binding| binding.id())
            .collect();
        assert_eq!(local, vec![first.id(), second.id()]);
    }

    #[test]
    fn alias_checks() {
        let single: Token<u32> = Token::single("single");
        let multi: Token<u32> = Token::multi("multi");
        let mut registry = Registry::default();

        assert_eq!(
            registry
                .register(node(), Binding::alias(&single, &single))
                .unwrap_err()
                .0,
            RegisterError::SelfAlias(single.info())
        );
        assert_eq!(
            registry
                .register(node(), Binding::alias(&single, &multi))
                .unwrap_err()
                .0,
            RegisterError::AliasToMulti {
                token: single.info(),
                target: multi.info()
            }
        );
        assert!(registry.lookup_local(single.id()).is_empty());
    }
}
