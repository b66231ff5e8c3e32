use strata_config::errors::ConfigError;
use strata_di::{DependencyGraphErrors, RegisterError, ResolveError};

use crate::modules::tasks::task_store::TaskError;

/// Everything that can stop the demo
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Graph(#[from] DependencyGraphErrors),
    #[error(transparent)]
    Task(#[from] TaskError),
}
