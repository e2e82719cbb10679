//! Task Dispatcher domain module: operator tasks derived from orders.

pub mod board;
pub mod task;

pub use board::TaskBoard;
pub use task::{describe, Task, TaskState};
