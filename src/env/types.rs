use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Auxiliary metadata attached to a step. Keys are unique, order is irrelevant.
pub type Info = Map<String, Value>;

/// The normalized result of one environment step.
///
/// `done` is always `terminated || truncated`. The only way to build a value is
/// [`CanonicalStep::new`], which derives `done` from the two cause flags, so the
/// invariant holds for every instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalStep {
    observation: Value,
    reward: f64,
    done: bool,
    terminated: bool,
    truncated: bool,
    info: Info,
}

impl CanonicalStep {
    pub fn new(observation: Value, reward: f64, terminated: bool, truncated: bool, info: Info) -> Self {
        Self {
            observation,
            reward,
            done: terminated || truncated,
            terminated,
            truncated,
            info,
        }
    }

    /// A step that carries only an observation: zero reward, not done, no info.
    pub fn observation_only(observation: Value) -> Self {
        Self::new(observation, 0.0, false, false, Info::new())
    }

    pub fn observation(&self) -> &Value {
        &self.observation
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// True if the episode ended for any reason.
    pub fn done(&self) -> bool {
        self.done
    }

    /// True if the episode reached a natural end state.
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// True if the episode was cut off by an external limit.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Observation rendered as text. Strings are returned as-is, anything else
    /// is serialized to JSON.
    pub fn observation_text(&self) -> String {
        match &self.observation {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn into_parts(self) -> (Value, f64, bool, bool, Info) {
        (
            self.observation,
            self.reward,
            self.terminated,
            self.truncated,
            self.info,
        )
    }
}

/// The `(state, reward, done)` triple text agents consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub state: String,
    pub reward: f64,
    pub done: bool,
}

impl From<&CanonicalStep> for StepOutput {
    fn from(step: &CanonicalStep) -> Self {
        Self {
            state: step.observation_text(),
            reward: step.reward(),
            done: step.done(),
        }
    }
}
