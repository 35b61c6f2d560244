mod errors;
mod normalizer;
mod shape;
mod traits;
mod types;

pub use errors::{EnvError, NormalizationFailure};
pub use normalizer::{Normalizer, NormalizerConfig, UnrecognizedShape, normalize, normalize_slice};
pub use shape::{ORDERED_LEN, StepShape};
pub use traits::{AsyncRawEnv, RawEnv};
pub use types::{CanonicalStep, Info, StepOutput};
