//! Repository traits for domain layer.

pub mod tasks;
pub mod users;

pub use tasks::{Task, TaskStore};
pub use users::{User, UserStore};
