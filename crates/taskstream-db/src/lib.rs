pub mod pool;
pub mod repos;

// Re-export commonly used items
pub use pool::{create_pool, run_migrations};
pub use repos::task::{
    NewTask, SortOrder, TaskFilter, TaskRepo, TaskRow, TaskSort, TaskStatsRow, TaskUpdate,
};
pub use repos::user::{UserRepo, UserRow};
