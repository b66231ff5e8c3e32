use once_cell::sync::Lazy;
use parking_lot::Mutex;
use strata_di::{Construct, Deferred, Dependencies, Dependency, DynError, Token};

use crate::modules::tasks::task_service::{TaskService, TASK_SERVICE};

pub static NOTIFICATIONS: Lazy<Token<NotificationService>> =
    Lazy::new(|| Token::single("notifications"));

/// Collects messages about board changes
pub struct NotificationService {
    // Deferred, the task service depends on this service
    tasks: Deferred<TaskService>,
    messages: Mutex<Vec<String>>,
}

impl NotificationService {
    pub fn publish(&self, message: &str) {
        // Only read once both services are constructed
        let open = self.tasks.open_count();
        let message = format!("{message} ({open} open)");

        tracing::info!("notification: {}", message);
        self.messages.lock().push(message);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Construct for NotificationService {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::deferred(&TASK_SERVICE)]
    }

    fn construct(deps: &Dependencies) -> Result<Self, DynError> {
        Ok(NotificationService {
            tasks: deps.deferred(&TASK_SERVICE)?,
            messages: Mutex::new(Vec::new()),
        })
    }
}
