use serde_json::{Map, Value};

use super::errors::NormalizationFailure;

/// Number of elements in the positional `[observation, reward, terminated, truncated, info]` format.
pub const ORDERED_LEN: usize = 5;

/// The structural kind of a raw step response, decided once on entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepShape<'a> {
    /// `[observation, reward, terminated, truncated, info]`
    OrderedSequence(&'a [Value; ORDERED_LEN]),
    /// Object carrying `terminated` and/or `truncated`. Any `done` key is ignored.
    StructuredWithCause(&'a Map<String, Value>),
    /// Object carrying `done` but no cause.
    StructuredWithDoneOnly(&'a Map<String, Value>),
    /// Bare text; the value itself is the observation.
    Scalar(&'a Value),
}

impl<'a> StepShape<'a> {
    /// Detection order: ordered sequence, object with a cause, object with
    /// `done` only, string. Anything else is a failure.
    pub fn classify(raw: &'a Value) -> Result<Self, NormalizationFailure> {
        match raw {
            Value::Array(items) => <&[Value; ORDERED_LEN]>::try_from(items.as_slice())
                .map(StepShape::OrderedSequence)
                .map_err(|_| NormalizationFailure::WrongArity { len: items.len() }),
            Value::Object(map) if map.contains_key("terminated") || map.contains_key("truncated") => {
                Ok(StepShape::StructuredWithCause(map))
            }
            Value::Object(map) if map.contains_key("done") => Ok(StepShape::StructuredWithDoneOnly(map)),
            Value::Object(_) => Err(NormalizationFailure::MissingOutcome),
            Value::String(_) => Ok(StepShape::Scalar(raw)),
            other => Err(NormalizationFailure::UnsupportedKind {
                kind: kind_name(other),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepShape::OrderedSequence(_) => "ordered_sequence",
            StepShape::StructuredWithCause(_) => "structured_with_cause",
            StepShape::StructuredWithDoneOnly(_) => "structured_with_done_only",
            StepShape::Scalar(_) => "scalar",
        }
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
