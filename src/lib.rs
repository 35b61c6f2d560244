pub mod env;
pub mod report;
pub mod rollout;
pub mod runtime;

#[cfg(feature = "python")]
mod python;

pub use env::{CanonicalStep, NormalizationFailure, Normalizer, NormalizerConfig, normalize};
