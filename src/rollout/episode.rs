use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::errors::RolloutError;
use super::traits::Policy;
use crate::env::{AsyncRawEnv, CanonicalStep, Normalizer, RawEnv};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    /// Stop after this many steps even if the environment never reports `done`.
    pub max_steps: Option<u64>,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            max_steps: Some(100),
        }
    }
}

/// Why an episode stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEnd {
    Terminated,
    Truncated,
    /// The rollout's own step budget ran out before the environment finished.
    StepLimit,
}

impl EpisodeEnd {
    fn of(step: &CanonicalStep) -> Option<Self> {
        if step.terminated() {
            Some(EpisodeEnd::Terminated)
        } else if step.truncated() {
            Some(EpisodeEnd::Truncated)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transition<A> {
    pub action: A,
    pub step: CanonicalStep,
}

#[derive(Debug, Clone, Serialize)]
pub struct Episode<A> {
    pub id: Uuid,
    pub initial: CanonicalStep,
    pub transitions: Vec<Transition<A>>,
    pub end: EpisodeEnd,
}

impl<A> Episode<A> {
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn total_reward(&self) -> f64 {
        self.transitions.iter().map(|t| t.step.reward()).sum()
    }

    pub fn last_step(&self) -> &CanonicalStep {
        self.transitions
            .last()
            .map(|t| &t.step)
            .unwrap_or(&self.initial)
    }
}

struct EpisodeBuilder<A> {
    id: Uuid,
    initial: CanonicalStep,
    transitions: Vec<Transition<A>>,
    max_steps: Option<u64>,
}

impl<A> EpisodeBuilder<A> {
    fn start(initial_obs: serde_json::Value, config: &RolloutConfig) -> Self {
        let id = Uuid::new_v4();
        debug!(%id, "episode started");
        Self {
            id,
            initial: CanonicalStep::observation_only(initial_obs),
            transitions: Vec::new(),
            max_steps: config.max_steps,
        }
    }

    fn current(&self) -> &CanonicalStep {
        self.transitions
            .last()
            .map(|t| &t.step)
            .unwrap_or(&self.initial)
    }

    fn budget_left(&self) -> bool {
        self.max_steps
            .is_none_or(|max| (self.transitions.len() as u64) < max)
    }

    /// Records a step and returns how the episode ended, if it did.
    fn record(&mut self, action: A, step: CanonicalStep) -> Option<EpisodeEnd> {
        let end = EpisodeEnd::of(&step);
        self.transitions.push(Transition { action, step });
        end
    }

    fn finish(self, end: EpisodeEnd) -> Episode<A> {
        let episode = Episode {
            id: self.id,
            initial: self.initial,
            transitions: self.transitions,
            end,
        };
        info!(
            id = %episode.id,
            steps = episode.len(),
            reward = episode.total_reward(),
            end = ?episode.end,
            "episode finished"
        );
        episode
    }
}

/// Reset `env`, then step it with actions from `policy` until a normalized
/// step reports `done` or the step budget runs out.
pub fn run_episode<E, P>(
    env: &mut E,
    policy: &mut P,
    normalizer: &Normalizer,
    config: &RolloutConfig,
) -> Result<Episode<E::Act>, RolloutError>
where
    E: RawEnv,
    P: Policy<E::Act>,
{
    let mut episode = EpisodeBuilder::start(env.reset()?, config);

    while episode.budget_left() {
        let action = policy.act(episode.current());
        let raw = env.step(action.clone())?;
        let step = normalizer.normalize(&raw)?;
        if let Some(end) = episode.record(action, step) {
            return Ok(episode.finish(end));
        }
    }

    Ok(episode.finish(EpisodeEnd::StepLimit))
}

pub async fn run_episode_async<E, P>(
    env: &mut E,
    policy: &mut P,
    normalizer: &Normalizer,
    config: &RolloutConfig,
) -> Result<Episode<E::Act>, RolloutError>
where
    E: AsyncRawEnv,
    P: Policy<E::Act>,
{
    let mut episode = EpisodeBuilder::start(env.reset().await?, config);

    while episode.budget_left() {
        let action = policy.act(episode.current());
        let raw = env.step(action.clone()).await?;
        let step = normalizer.normalize(&raw)?;
        if let Some(end) = episode.record(action, step) {
            return Ok(episode.finish(end));
        }
    }

    Ok(episode.finish(EpisodeEnd::StepLimit))
}

/// Run one episode per `(env, policy)` pair concurrently. Results keep the
/// order of `workers`.
pub async fn run_episodes<E, P>(
    workers: &mut [(E, P)],
    normalizer: &Normalizer,
    config: &RolloutConfig,
) -> Vec<Result<Episode<E::Act>, RolloutError>>
where
    E: AsyncRawEnv,
    P: Policy<E::Act>,
{
    join_all(
        workers
            .iter_mut()
            .map(|(env, policy)| run_episode_async(env, policy, normalizer, config)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvError, NormalizationFailure};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    /// Answers in the positional format and truncates after `limit` steps.
    /// The action "stop" ends the episode with an object response instead.
    struct CountingEnv {
        step_count: u64,
        limit: u64,
    }

    impl CountingEnv {
        fn new(limit: u64) -> Self {
            Self {
                step_count: 0,
                limit,
            }
        }

        fn respond(&mut self, act: &str) -> Value {
            self.step_count += 1;
            if act == "stop" {
                return json!({
                    "observation": "stopped",
                    "reward": 1.0,
                    "terminated": true,
                    "info": {"step": self.step_count}
                });
            }
            let truncated = self.step_count >= self.limit;
            json!([format!("page {}", self.step_count), 0.5, false, truncated, null])
        }
    }

    impl RawEnv for CountingEnv {
        type Act = String;

        fn reset(&mut self) -> Result<Value, EnvError> {
            self.step_count = 0;
            Ok(json!("start page"))
        }

        fn step(&mut self, act: String) -> Result<Value, EnvError> {
            Ok(self.respond(&act))
        }
    }

    #[async_trait]
    impl AsyncRawEnv for CountingEnv {
        type Act = String;

        async fn reset(&mut self) -> Result<Value, EnvError> {
            self.step_count = 0;
            Ok(json!("start page"))
        }

        async fn step(&mut self, act: String) -> Result<Value, EnvError> {
            Ok(self.respond(&act))
        }
    }

    fn click(_: &CanonicalStep) -> String {
        "click".to_string()
    }

    #[test]
    fn stops_on_truncation() {
        let mut env = CountingEnv::new(3);
        let episode =
            run_episode(&mut env, &mut click, &Normalizer::default(), &RolloutConfig::default()).unwrap();

        assert_eq!(episode.len(), 3);
        assert_eq!(episode.end, EpisodeEnd::Truncated);
        assert_eq!(episode.total_reward(), 1.5);
        assert!(episode.last_step().done());
        assert_eq!(episode.initial.observation(), &json!("start page"));
    }

    #[test]
    fn stops_on_termination() {
        let mut env = CountingEnv::new(10);
        let mut policy = |step: &CanonicalStep| {
            if step.observation() == &json!("page 2") {
                "stop".to_string()
            } else {
                "click".to_string()
            }
        };
        let episode =
            run_episode(&mut env, &mut policy, &Normalizer::default(), &RolloutConfig::default()).unwrap();

        assert_eq!(episode.len(), 3);
        assert_eq!(episode.end, EpisodeEnd::Terminated);
        assert_eq!(episode.transitions[2].action, "stop");
        assert_eq!(episode.total_reward(), 2.0);
    }

    #[test]
    fn step_budget_caps_the_episode() {
        let mut env = CountingEnv::new(50);
        let config = RolloutConfig { max_steps: Some(4) };
        let episode = run_episode(&mut env, &mut click, &Normalizer::default(), &config).unwrap();

        assert_eq!(episode.len(), 4);
        assert_eq!(episode.end, EpisodeEnd::StepLimit);
        assert!(!episode.last_step().done());
    }

    #[test]
    fn bad_response_aborts_the_episode() {
        struct BrokenEnv;

        impl RawEnv for BrokenEnv {
            type Act = String;

            fn reset(&mut self) -> Result<Value, EnvError> {
                Ok(json!("start"))
            }

            fn step(&mut self, _act: String) -> Result<Value, EnvError> {
                Ok(json!(["too", "short"]))
            }
        }

        let err = run_episode(&mut BrokenEnv, &mut click, &Normalizer::default(), &RolloutConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            RolloutError::Normalize(NormalizationFailure::WrongArity { len: 2 })
        ));
    }

    #[tokio::test]
    async fn runs_many_episodes_concurrently() {
        let mut workers: Vec<_> = [2, 5]
            .into_iter()
            .map(|limit| (CountingEnv::new(limit), click as fn(&CanonicalStep) -> String))
            .collect();

        let results = run_episodes(&mut workers, &Normalizer::default(), &RolloutConfig::default()).await;

        let lengths: Vec<usize> = results.into_iter().map(|r| r.unwrap().len()).collect();
        assert_eq!(lengths, vec![2, 5]);
    }
}
