use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EidError {
    #[error("Endpoint identifier is empty")]
    Empty,

    #[error("Endpoint identifier has no scheme: {0}")]
    MissingScheme(String),

    #[error("Malformed {scheme} endpoint identifier: {eid}")]
    Malformed { scheme: String, eid: String },
}

pub type EidResult<T> = Result<T, EidError>;
