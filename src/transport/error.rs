use crate::bundle::Eid;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transfer to {peer} rejected: {reason}")]
    Rejected { peer: Eid, reason: String },

    #[error("No connection to {0}")]
    NoConnection(Eid),

    #[error("Transport shut down")]
    Closed,
}

pub type TransportResult<T> = Result<T, TransportError>;
