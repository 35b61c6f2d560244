use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::NormalizationFailure;
use super::shape::{StepShape, kind_name};
use super::types::{CanonicalStep, Info};

/// What to do with a payload that matches none of the supported shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnrecognizedShape {
    /// Fail with a [`NormalizationFailure`].
    #[default]
    Reject,
    /// Keep the raw value as the observation of a not-done, zero-reward step.
    TreatAsScalar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub on_unrecognized: UnrecognizedShape,
}

/// Maps raw step responses onto [`CanonicalStep`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn normalize(&self, raw: &Value) -> Result<CanonicalStep, NormalizationFailure> {
        match StepShape::classify(raw) {
            Ok(shape) => {
                debug!(shape = shape.name(), "normalizing step response");
                Ok(from_shape(shape))
            }
            Err(failure) => match self.config.on_unrecognized {
                UnrecognizedShape::Reject => {
                    warn!(%failure, "rejecting step response");
                    Err(failure)
                }
                UnrecognizedShape::TreatAsScalar => {
                    debug!(%failure, "treating unrecognized step response as observation");
                    Ok(CanonicalStep::observation_only(raw.clone()))
                }
            },
        }
    }

    /// Decode a JSON payload and normalize it.
    pub fn normalize_slice(&self, bytes: &[u8]) -> Result<CanonicalStep, NormalizationFailure> {
        let raw: Value = serde_json::from_slice(bytes)
            .map_err(|e| NormalizationFailure::Decode(e.to_string()))?;
        self.normalize(&raw)
    }
}

/// Normalize with the default configuration, which rejects unrecognized shapes.
pub fn normalize(raw: &Value) -> Result<CanonicalStep, NormalizationFailure> {
    Normalizer::default().normalize(raw)
}

pub fn normalize_slice(bytes: &[u8]) -> Result<CanonicalStep, NormalizationFailure> {
    Normalizer::default().normalize_slice(bytes)
}

fn from_shape(shape: StepShape<'_>) -> CanonicalStep {
    match shape {
        StepShape::OrderedSequence([observation, reward, terminated, truncated, info]) => {
            CanonicalStep::new(
                observation.clone(),
                resolve_reward(Some(reward)),
                resolve_flag("terminated", Some(terminated)),
                resolve_flag("truncated", Some(truncated)),
                resolve_info(Some(info)),
            )
        }
        StepShape::StructuredWithCause(fields) => {
            let step = CanonicalStep::new(
                resolve_observation(fields.get("observation")),
                resolve_reward(fields.get("reward")),
                resolve_flag("terminated", fields.get("terminated")),
                resolve_flag("truncated", fields.get("truncated")),
                resolve_info(fields.get("info")),
            );
            if let Some(literal) = fields.get("done") {
                if resolve_flag("done", Some(literal)) != step.done() {
                    debug!(
                        literal = %literal,
                        derived = step.done(),
                        "ignoring literal done in favour of terminated/truncated"
                    );
                }
            }
            step
        }
        StepShape::StructuredWithDoneOnly(fields) => {
            // No cause is reported, so a finished episode counts as terminated.
            let done = resolve_flag("done", fields.get("done"));
            CanonicalStep::new(
                resolve_observation(fields.get("observation")),
                resolve_reward(fields.get("reward")),
                done,
                false,
                resolve_info(fields.get("info")),
            )
        }
        StepShape::Scalar(raw) => CanonicalStep::observation_only(raw.clone()),
    }
}

fn resolve_observation(value: Option<&Value>) -> Value {
    value.cloned().unwrap_or(Value::Null)
}

fn resolve_reward(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        None | Some(Value::Null) => 0.0,
        Some(other) => {
            debug!(kind = kind_name(other), "non-numeric reward, using 0");
            0.0
        }
    }
}

fn resolve_flag(field: &'static str, value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        None | Some(Value::Null) => false,
        Some(other) => {
            debug!(field, kind = kind_name(other), "non-boolean flag, using false");
            false
        }
    }
}

fn resolve_info(value: Option<&Value>) -> Info {
    match value {
        Some(Value::Object(map)) => map.clone(),
        None | Some(Value::Null) => Info::new(),
        Some(other) => {
            warn!(kind = kind_name(other), "info is not an object, dropping it");
            Info::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ordered_sequence() {
        let step = normalize(&json!(["Current webpage observation...", 0.5, true, false, {"info": "test"}])).unwrap();
        assert_eq!(step.observation(), &json!("Current webpage observation..."));
        assert_eq!(step.reward(), 0.5);
        assert!(step.done());
        assert!(step.terminated());
        assert!(!step.truncated());
        assert_eq!(step.info().get("info"), Some(&json!("test")));
    }

    #[test]
    fn ordered_sequence_defaults_bad_fields() {
        let step = normalize(&json!([{"text": "tree"}, "high", null, 1, null])).unwrap();
        assert_eq!(step.observation(), &json!({"text": "tree"}));
        assert_eq!(step.reward(), 0.0);
        assert!(!step.terminated());
        assert!(step.truncated());
        assert!(step.done());
        assert!(step.info().is_empty());
    }

    #[test]
    fn literal_done_is_ignored_when_cause_present() {
        let step = normalize(&json!({"observation": "x", "terminated": true, "done": false})).unwrap();
        assert!(step.done());

        let step = normalize(&json!({"observation": "x", "terminated": false, "done": true})).unwrap();
        assert!(!step.done());
        assert!(!step.terminated());
    }

    #[test]
    fn truncation_alone_sets_done() {
        let step = normalize(&json!({"observation": "x", "terminated": false, "truncated": true})).unwrap();
        assert!(step.done());
        assert!(!step.terminated());
        assert!(step.truncated());
    }

    #[test]
    fn done_only_is_attributed_to_termination() {
        let step = normalize(&json!({"observation": "Final state", "reward": 0.8, "done": true, "info": {}})).unwrap();
        assert!(step.done());
        assert!(step.terminated());
        assert!(!step.truncated());

        let step = normalize(&json!({"observation": "mid", "done": false})).unwrap();
        assert!(!step.done());
        assert!(!step.terminated());
    }

    #[test]
    fn zero_reward_and_empty_info_are_kept() {
        let step = normalize(&json!({"observation": "x", "reward": 0, "terminated": false, "info": {}})).unwrap();
        assert_eq!(step.reward(), 0.0);
        assert_eq!(step.info(), &Info::new());
    }

    #[test]
    fn non_object_info_is_dropped() {
        let step = normalize(&json!(["obs", 1.0, false, false, "not a map"])).unwrap();
        assert!(step.info().is_empty());
    }

    #[test]
    fn plain_string() {
        let step = normalize(&json!("Simple observation text")).unwrap();
        assert_eq!(step.observation(), &json!("Simple observation text"));
        assert_eq!(step.reward(), 0.0);
        assert!(!step.done());
        assert!(!step.terminated());
        assert!(!step.truncated());
        assert!(step.info().is_empty());
    }

    #[test]
    fn lenient_config_keeps_unrecognized_value() {
        let normalizer = Normalizer::new(NormalizerConfig {
            on_unrecognized: UnrecognizedShape::TreatAsScalar,
        });
        let step = normalizer.normalize(&json!([1, 2])).unwrap();
        assert_eq!(step.observation(), &json!([1, 2]));
        assert!(!step.done());

        assert_eq!(
            normalize(&json!([1, 2])),
            Err(NormalizationFailure::WrongArity { len: 2 })
        );
    }

    #[test]
    fn config_reads_from_json() {
        let config: NormalizerConfig =
            serde_json::from_value(json!({"on_unrecognized": "treat_as_scalar"})).unwrap();
        assert_eq!(config.on_unrecognized, UnrecognizedShape::TreatAsScalar);

        let config: NormalizerConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, NormalizerConfig::default());
    }

    #[test]
    fn slice_decode_errors() {
        assert!(matches!(
            normalize_slice(b"{not json"),
            Err(NormalizationFailure::Decode(_))
        ));
        let step = normalize_slice(br#"{"observation": "ok", "terminated": true}"#).unwrap();
        assert!(step.done());
    }
}
