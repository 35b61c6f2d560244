use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::env::{CanonicalStep, Normalizer};
use crate::runtime::error::Error;

/// The transport's half: send the raw response body, or the error it hit.
pub type StepResponseSender = oneshot::Sender<Result<Vec<u8>, Error>>;

pin_project! {
    /// A pending step response that resolves to a [`CanonicalStep`].
    ///
    /// The transport sends the raw JSON body through the paired
    /// [`StepResponseSender`]; when it arrives the bytes are decoded and
    /// normalized. Dropping the sender resolves to [`Error::Canceled`].
    #[derive(Debug)]
    pub struct StepResponseSource {
        #[pin]
        receiver: oneshot::Receiver<Result<Vec<u8>, Error>>,
        normalizer: Normalizer,
    }
}

impl StepResponseSource {
    pub fn from_receiver(
        receiver: oneshot::Receiver<Result<Vec<u8>, Error>>,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            receiver,
            normalizer,
        }
    }

    pub fn channel(normalizer: Normalizer) -> (StepResponseSender, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self::from_receiver(receiver, normalizer))
    }
}

impl Future for StepResponseSource {
    type Output = Result<CanonicalStep, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.receiver.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(Ok(bytes))) => {
                let decoded = serde_json::from_slice::<Value>(&bytes)
                    .map_err(|e| Error::Deserialize(e.to_string()))
                    .and_then(|raw| this.normalizer.normalize(&raw).map_err(Error::from));
                Poll::Ready(decoded)
            }
            Poll::Ready(Ok(Err(e))) => Poll::Ready(Err(e)),
            Poll::Ready(Err(e)) => Poll::Ready(Err(e.into())),
        }
    }
}
