pub mod board;
pub mod http;
pub mod notifications;
pub mod tasks;
