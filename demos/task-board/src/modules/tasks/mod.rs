pub mod task;
pub mod task_service;
pub mod task_store;
