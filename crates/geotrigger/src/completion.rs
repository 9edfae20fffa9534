//! Write-once completion signals.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::Result;
use crate::error::Error;

/// A result that is delivered exactly once by a background task.
///
/// Awaiting a `Completion` yields the task's result. If the task went away
/// without answering, it yields [`Error::ManagerStopped`].
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Completion<T> {
    /// Create the sending half and the completion it resolves.
    pub(crate) fn channel() -> (oneshot::Sender<Result<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A completion that is already resolved.
    pub(crate) fn ready(result: Result<T>) -> Self {
        let (tx, completion) = Self::channel();
        let _ = tx.send(result);
        completion
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(Error::ManagerStopped)))
    }
}
