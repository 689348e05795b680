//! Cooperative round-robin task dispatch

pub mod scheduler;
pub mod task;

pub use scheduler::RoundRobin;
pub use task::{TaskId, TaskOutcome, TASK_COUNT};
