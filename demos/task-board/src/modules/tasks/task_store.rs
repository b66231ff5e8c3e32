use once_cell::sync::Lazy;
use parking_lot::Mutex;
use strata_di::{Construct, Dependencies, Dependency, DynError, Multiplicity, Scope, Token};

use super::task::{Task, TaskId};
use crate::tokens::BOARD_CONFIG;

/// One store for the whole application
pub static TASK_STORE: Lazy<Token<TaskStore>> =
    Lazy::new(|| Token::define("task_store", Multiplicity::Single, Scope::Root));

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task #{0} does not exist")]
    NotFound(TaskId),
    #[error("The board is full, it holds at most {0} tasks")]
    Full(usize),
}

/// In memory task storage
pub struct TaskStore {
    capacity: usize,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    next_id: TaskId,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(capacity: usize) -> Self {
        TaskStore {
            capacity,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn add(&self, title: &str) -> Result<Task, TaskError> {
        let mut state = self.state.lock();
        if state.tasks.len() >= self.capacity {
            return Err(TaskError::Full(self.capacity));
        }

        state.next_id += 1;
        let task = Task {
            id: state.next_id,
            title: title.to_string(),
            done: false,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    pub fn complete(&self, id: TaskId) -> Result<Task, TaskError> {
        let mut state = self.state.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.done = true;
        Ok(task.clone())
    }

    pub fn list(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().tasks.iter().filter(|task| !task.done).count()
    }
}

impl Construct for TaskStore {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::on(&BOARD_CONFIG)]
    }

    fn construct(deps: &Dependencies) -> Result<Self, DynError> {
        let config = deps.get(&BOARD_CONFIG)?;
        Ok(TaskStore::new(config.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_capacity_and_completion() {
        let store = TaskStore::new(1);
        let task = store.add("ship it").unwrap();

        assert_eq!(store.add("one more").unwrap_err(), TaskError::Full(1));
        assert!(store.complete(task.id).unwrap().done);
        assert_eq!(store.complete(42).unwrap_err(), TaskError::NotFound(42));
        assert_eq!(store.open_count(), 0);
    }
}
