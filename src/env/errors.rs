use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationFailure {
    #[error("ordered step response must have 5 elements, got {len}")]
    WrongArity { len: usize },

    #[error("unsupported step response kind: {kind}")]
    UnsupportedKind { kind: &'static str },

    #[error("step response object has none of `terminated`, `truncated` or `done`")]
    MissingOutcome,

    #[error("step response is not valid JSON: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Environment error: {0}")]
    EnvError(#[from] Box<dyn std::error::Error + Send + Sync>),
}
