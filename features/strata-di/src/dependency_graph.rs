use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use thiserror::Error;

use crate::{
    binding::{Binding, BindingId},
    errors::{format_chain, ResolveError},
    injector::{Node, NodeId},
    resolver::path_from_root,
    token::{Multiplicity, TokenId, TokenInfo},
};

/// Snapshot of every binding visible from one injector
///
/// Used to check for missing and circular dependencies without constructing anything.
/// Dependencies of a binding are looked up from the injector owning it, the same way
/// resolution does.
pub struct DependencyGraph {
    /// Registries from the root (index 0) down to the inspected injector
    levels: Vec<HashMap<TokenId, Vec<Arc<Binding>>>>,
}

/// A binding together with the level its dependencies resolve from
#[derive(Clone)]
struct Entry {
    binding: Arc<Binding>,
    level: usize,
}

impl DependencyGraph {
    pub(crate) fn new(node: &Arc<Node>) -> Result<Self, DependencyGraphErrors> {
        node.ensure_alive()?;
        let path = path_from_root(node)?;

        let levels = path
            .iter()
            .map(|level| {
                let mut map: HashMap<TokenId, Vec<Arc<Binding>>> = HashMap::new();
                for binding in level.all_bindings() {
                    map.entry(binding.token().id).or_default().push(binding);
                }
                map
            })
            .collect();

        Ok(DependencyGraph { levels })
    }

    fn leaf(&self) -> usize {
        self.levels.len() - 1
    }

    /// Bindings of `token` visible from `level` together with the level owning them
    fn visible(&self, level: usize, token: TokenInfo) -> Vec<(usize, Arc<Binding>)> {
        match token.multiplicity {
            Multiplicity::Single => (0..=level)
                .rev()
                .find_map(|owner| {
                    self.levels[owner]
                        .get(&token.id)
                        .and_then(|bindings| bindings.first())
                        .map(|binding| (owner, binding.clone()))
                })
                .into_iter()
                .collect(),
            Multiplicity::Multi => (0..=level)
                .flat_map(|owner| {
                    self.levels[owner]
                        .get(&token.id)
                        .into_iter()
                        .flatten()
                        .map(move |binding| (owner, binding.clone()))
                })
                .collect(),
        }
    }

    /// Every binding which is effective at the inspected injector, root first
    fn effective(&self) -> Vec<Entry> {
        let leaf = self.leaf();
        let mut tokens: Vec<TokenInfo> = Vec::new();
        let mut seen = HashSet::new();
        for level in &self.levels {
            let mut bindings: Vec<&Arc<Binding>> = level.values().flatten().collect();
            bindings.sort_by_key(|binding| binding.id());
            for binding in bindings {
                if seen.insert(binding.token()) {
                    tokens.push(binding.token());
                }
            }
        }

        tokens
            .into_iter()
            .flat_map(|token| self.visible(leaf, token))
            .map(|(level, binding)| Entry { binding, level })
            .collect()
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in self.effective() {
            let mut dependency_chain = Vec::new();
            check_recurse(self, &mut checked, &mut errors, &mut dependency_chain, &entry);
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse(
            graph: &DependencyGraph,
            checked: &mut HashSet<(BindingId, usize)>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<(BindingId, usize, TokenInfo)>,
            entry: &Entry,
        ) {
            let key = (entry.binding.id(), entry.level);
            let token = entry.binding.token();

            // Circular Dependency Check
            if let Some(start) = dependency_chain
                .iter()
                .position(|(id, level, _)| (*id, *level) == key)
            {
                let mut chain: Vec<TokenInfo> = dependency_chain[start..]
                    .iter()
                    .map(|(_, _, token)| *token)
                    .collect();
                chain.push(token);

                let from = dependency_chain
                    .last()
                    .map(|(_, _, token)| *token)
                    .unwrap_or(token);

                errors.push(DependencyGraphError::CircularDependency {
                    from,
                    to: token,
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(key) {
                return;
            }

            dependency_chain.push((key.0, key.1, token));

            for dependency in entry.binding.dependencies() {
                let targets = graph.visible(entry.level, dependency.token);

                if targets.is_empty() && !dependency.optional {
                    errors.push(DependencyGraphError::MissingDependency {
                        dependency: dependency.token,
                        required_by: token,
                    });
                }

                if dependency.lazy {
                    if dependency.token.is_multi() {
                        errors.push(DependencyGraphError::DeferredMulti {
                            dependency: dependency.token,
                            required_by: token,
                        });
                    }
                    // Resolved after construction, cannot take part in a construction cycle
                    continue;
                }

                for (level, binding) in targets {
                    let next = Entry { binding, level };
                    check_recurse(graph, checked, errors, dependency_chain, &next);
                }
            }

            dependency_chain.pop();
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: TokenInfo,
        required_by: TokenInfo,
    },
    #[error(
        "A Circular Dependency exists between '{from}' and '{to}' through {} - Consider using `Dependency::deferred`",
        format_chain(.chain)
    )]
    CircularDependency {
        from: TokenInfo,
        to: TokenInfo,
        chain: Vec<TokenInfo>,
    },
    #[error("'{required_by}' defers the multi token '{dependency}', only single tokens can be deferred")]
    DeferredMulti {
        dependency: TokenInfo,
        required_by: TokenInfo,
    },
    #[error("Injector {0} has been destroyed")]
    Destroyed(NodeId),
    #[error("Injector could not be inspected: {0}")]
    Inspection(ResolveError),
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("The dependency graph had one or more errors:")?;
        for error in &self.errors {
            write!(f, "\n- {error}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}

impl From<ResolveError> for DependencyGraphErrors {
    fn from(error: ResolveError) -> Self {
        let error = match error {
            ResolveError::Destroyed(id) => DependencyGraphError::Destroyed(id),
            other => DependencyGraphError::Inspection(other),
        };
        DependencyGraphErrors {
            errors: vec![error],
        }
    }
}
