use super::errors::EnvError;
use async_trait::async_trait;
use serde_json::Value;

/// An environment that answers with untyped payloads, as an environment
/// server does over the wire.
///
/// `reset` returns the initial observation. `step` returns the raw step
/// response in whichever shape the server produces; callers run it through a
/// [`Normalizer`](super::Normalizer).
pub trait RawEnv: Send {
    type Act: Send + Clone + 'static;

    fn reset(&mut self) -> Result<Value, EnvError>;
    fn step(&mut self, act: Self::Act) -> Result<Value, EnvError>;
    fn close(&mut self) -> Result<(), EnvError> {
        Ok(())
    }
}

#[async_trait]
pub trait AsyncRawEnv: Send {
    type Act: Send + Clone + 'static;

    async fn reset(&mut self) -> Result<Value, EnvError>;
    async fn step(&mut self, act: Self::Act) -> Result<Value, EnvError>;
    async fn close(&mut self) -> Result<(), EnvError> {
        Ok(())
    }
}
