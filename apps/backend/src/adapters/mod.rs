//! Adapters for external dependencies.

pub mod tasks_mem;
pub mod users_mem;

pub use tasks_mem::InMemoryTaskStore;
pub use users_mem::InMemoryUserStore;
