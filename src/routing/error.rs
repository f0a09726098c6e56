use crate::queue::QueueError;
use crate::storage::StorageError;
use crate::transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dispatcher worker error: {0}")]
    Worker(String),
}

impl RoutingError {
    /// The task queue was aborted; the dispatcher shuts down normally
    pub fn is_shutdown(&self) -> bool {
        matches!(self, RoutingError::Queue(QueueError::Aborted))
    }
}

pub type RoutingResult<T> = Result<T, RoutingError>;
