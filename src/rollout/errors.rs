use crate::env::{EnvError, NormalizationFailure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RolloutError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("bad step response: {0}")]
    Normalize(#[from] NormalizationFailure),
}
