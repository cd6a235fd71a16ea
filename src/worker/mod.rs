// ABOUTME: Worker module - the capability trait, task types, and the pool.
// ABOUTME: Everything above this boundary is coordination, not execution.

mod pool;
mod task;
mod traits;

pub use pool::WorkerPool;
pub use task::{Stage, Task};
pub use traits::Worker;
