use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was aborted; no further tasks will be handed out
    #[error("Task queue aborted")]
    Aborted,
}

pub type QueueResult<T> = Result<T, QueueError>;
