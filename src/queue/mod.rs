pub mod error;
pub mod queue;
pub mod task;

pub use error::{QueueError, QueueResult};
pub use queue::{QueueStats, TaskQueue};
pub use task::Task;
