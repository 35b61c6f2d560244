use thiserror::Error;

use crate::env::NormalizationFailure;

#[derive(Debug, Error)]
pub enum Error {
    #[error("step response canceled")]
    Canceled,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error(transparent)]
    Normalize(#[from] NormalizationFailure),
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::Canceled
    }
}
