//! Scenario harness: normalize a list of inputs, check each output against
//! what is expected, and produce a console report.

use std::fmt;

use serde_json::{Value, json};
use tracing::{error, info};

use crate::env::{CanonicalStep, Info, NormalizationFailure, Normalizer};

/// Expected field values. `None` means the field is not checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expectation {
    pub done: Option<bool>,
    pub terminated: Option<bool>,
    pub truncated: Option<bool>,
    pub reward: Option<f64>,
    pub observation: Option<Value>,
    pub info: Option<Info>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub input: Value,
    pub expect: Expectation,
}

impl Scenario {
    pub fn new(name: impl Into<String>, input: Value, expect: Expectation) -> Self {
        Self {
            name: name.into(),
            input,
            expect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub name: String,
    pub input: Value,
    pub output: Result<CanonicalStep, NormalizationFailure>,
    pub checks: Vec<Check>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.output.is_ok() && self.checks.iter().all(|c| c.passed)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    /// True when every scenario normalized and every check held.
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|s| !s.passed())
    }
}

pub fn run_scenarios(normalizer: &Normalizer, scenarios: &[Scenario]) -> RunReport {
    let scenarios = scenarios
        .iter()
        .map(|scenario| run_scenario(normalizer, scenario))
        .collect();
    let report = RunReport { scenarios };

    if report.passed() {
        info!(count = report.scenarios.len(), "all scenarios passed");
    } else {
        error!(failed = report.failures().count(), "scenario run failed");
    }
    report
}

fn run_scenario(normalizer: &Normalizer, scenario: &Scenario) -> ScenarioReport {
    let output = normalizer.normalize(&scenario.input);
    let checks = match &output {
        Ok(step) => check(step, &scenario.expect),
        Err(failure) => {
            error!(scenario = %scenario.name, %failure, "normalization failed");
            Vec::new()
        }
    };
    ScenarioReport {
        name: scenario.name.clone(),
        input: scenario.input.clone(),
        output,
        checks,
    }
}

fn check(step: &CanonicalStep, expect: &Expectation) -> Vec<Check> {
    let mut checks = vec![Check {
        name: "invariant_holds",
        passed: step.done() == (step.terminated() || step.truncated()),
    }];
    let mut push = |name, passed: Option<bool>| {
        if let Some(passed) = passed {
            checks.push(Check { name, passed });
        }
    };
    push("done_correct", expect.done.map(|v| step.done() == v));
    push("terminated_correct", expect.terminated.map(|v| step.terminated() == v));
    push("truncated_correct", expect.truncated.map(|v| step.truncated() == v));
    push("reward_correct", expect.reward.map(|v| step.reward() == v));
    push(
        "observation_correct",
        expect.observation.as_ref().map(|v| step.observation() == v),
    );
    push("info_correct", expect.info.as_ref().map(|v| step.info() == v));
    checks
}

/// The reference inputs: one per supported shape, plus truncation on its own.
pub fn reference_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "array response",
            json!(["Current webpage observation...", 0.5, true, false, {"info": "test"}]),
            Expectation {
                done: Some(true),
                terminated: Some(true),
                truncated: Some(false),
                reward: Some(0.5),
                observation: Some(json!("Current webpage observation...")),
                ..Default::default()
            },
        ),
        Scenario::new(
            "object with terminated",
            json!({
                "observation": "Browser state...",
                "reward": 1.0,
                "terminated": true,
                "truncated": false,
                "info": {"step": 10}
            }),
            Expectation {
                done: Some(true),
                terminated: Some(true),
                ..Default::default()
            },
        ),
        Scenario::new(
            "object with done",
            json!({"observation": "Final state", "reward": 0.8, "done": true, "info": {}}),
            Expectation {
                done: Some(true),
                terminated: Some(true),
                truncated: Some(false),
                ..Default::default()
            },
        ),
        Scenario::new(
            "string response",
            json!("Simple observation text"),
            Expectation {
                done: Some(false),
                reward: Some(0.0),
                observation: Some(json!("Simple observation text")),
                info: Some(Info::new()),
                ..Default::default()
            },
        ),
        Scenario::new(
            "object with truncated only",
            json!({"observation": "Step limit", "reward": 0.0, "terminated": false, "truncated": true, "info": {}}),
            Expectation {
                done: Some(true),
                terminated: Some(false),
                truncated: Some(true),
                ..Default::default()
            },
        ),
    ]
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, fmt::Error> {
    serde_json::to_string(value).map_err(|_| fmt::Error)
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed() { "pass" } else { "FAIL" };
        writeln!(f, "[{mark}] {}", self.name)?;
        writeln!(f, "  input:  {}", self.input)?;
        match &self.output {
            Ok(step) => writeln!(f, "  output: {}", to_json(step)?)?,
            Err(failure) => writeln!(f, "  error:  {failure}")?,
        }
        for check in &self.checks {
            writeln!(f, "  {}: {}", check.name, check.passed)?;
        }
        Ok(())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scenario in &self.scenarios {
            writeln!(f, "{scenario}")?;
        }
        let failed = self.failures().count();
        if failed == 0 {
            write!(f, "all {} scenarios passed", self.scenarios.len())
        } else {
            write!(f, "{failed} of {} scenarios failed", self.scenarios.len())
        }
    }
}
