//! Tests for resolution through the injector hierarchy

mod graph_tests;
mod scope_tests;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counts how often a factory ran
#[derive(Clone, Default)]
pub(crate) struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
