use std::sync::Arc;

use once_cell::sync::Lazy;
use strata_di::{Construct, Dependencies, Dependency, DynError, Token};

use super::{
    task::{Task, TaskId},
    task_store::{TaskError, TaskStore, TASK_STORE},
};
use crate::modules::{
    http::http_client::{HttpClient, Request, HTTP_CLIENT},
    notifications::notification_service::{NotificationService, NOTIFICATIONS},
};

pub static TASK_SERVICE: Lazy<Token<TaskService>> = Lazy::new(|| Token::single("task_service"));

/// Name older components still ask for, bound as an alias of [TASK_SERVICE]
pub static LEGACY_TASK_API: Lazy<Token<TaskService>> =
    Lazy::new(|| Token::single("legacy_task_api"));

/// Use cases of the board
///
/// Notifies on every change. The notification service in turn reads the service back
/// through a deferred dependency.
pub struct TaskService {
    store: Arc<TaskStore>,
    client: Arc<HttpClient>,
    notifications: Arc<NotificationService>,
}

impl TaskService {
    pub fn create(&self, title: &str) -> Result<Task, TaskError> {
        let task = self.store.add(title)?;
        self.client.send(Request::new("POST", format!("/tasks/{}", task.id)));
        self.notifications.publish(&format!("created {task}"));
        Ok(task)
    }

    pub fn complete(&self, id: TaskId) -> Result<Task, TaskError> {
        let task = self.store.complete(id)?;
        self.client.send(Request::new("PUT", format!("/tasks/{}/done", task.id)));
        self.notifications.publish(&format!("completed {task}"));
        Ok(task)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.store.list()
    }

    pub fn open_count(&self) -> usize {
        self.store.open_count()
    }
}

impl Construct for TaskService {
    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::on(&TASK_STORE),
            Dependency::on(&HTTP_CLIENT),
            Dependency::on(&NOTIFICATIONS),
        ]
    }

    fn construct(deps: &Dependencies) -> Result<Self, DynError> {
        Ok(TaskService {
            store: deps.get(&TASK_STORE)?,
            client: deps.get(&HTTP_CLIENT)?,
            notifications: deps.get(&NOTIFICATIONS)?,
        })
    }
}
