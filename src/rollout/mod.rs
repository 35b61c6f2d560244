mod episode;
mod errors;
mod traits;

pub use episode::{
    Episode, EpisodeEnd, RolloutConfig, Transition, run_episode, run_episode_async, run_episodes,
};
pub use errors::RolloutError;
pub use traits::Policy;
