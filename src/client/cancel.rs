//! Cancelable request futures.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{AbortHandle, Abortable, BoxFuture};
use futures::FutureExt;
use tracing::debug;

use crate::error::ClientError;
use crate::metrics;

/// Handle that cancels the [`Cancelable`] it was taken from.
///
/// Cloneable and usable from any task.
#[derive(Debug, Clone)]
pub struct CancelHandle(AbortHandle);

impl CancelHandle {
    /// Cancel the call. Idempotent.
    pub fn cancel(&self) {
        self.0.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_aborted()
    }
}

/// A single in-flight request.
///
/// Resolves to the request's result, or to [`ClientError::Cancelled`] once
/// [`CancelHandle::cancel`] has been called: after cancellation the underlying
/// response or transport error is never delivered. Dropping the future before
/// it resolves cancels it: the request is abandoned and outstanding
/// [`CancelHandle`]s report it as cancelled.
#[must_use = "futures do nothing unless polled"]
pub struct Cancelable<T> {
    inner: Abortable<BoxFuture<'static, Result<T, ClientError>>>,
    handle: CancelHandle,
    endpoint: &'static str,
    settled: bool,
}

impl<T> Cancelable<T> {
    /// Wrap a request future.
    pub fn new<F>(endpoint: &'static str, future: F) -> Self
    where
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let (abort, registration) = AbortHandle::new_pair();
        Self {
            inner: Abortable::new(future.boxed(), registration),
            handle: CancelHandle(abort),
            endpoint,
            settled: false,
        }
    }

    /// Get a handle that can cancel this call from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    /// Cancel this call.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }
}

impl<T> Future for Cancelable<T> {
    type Output = Result<T, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.inner.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => {
                self.settled = true;
                Poll::Ready(result)
            }
            Poll::Ready(Err(_aborted)) => {
                self.settled = true;
                debug!(endpoint = self.endpoint, "Request cancelled");
                metrics::inc_request_outcome(self.endpoint, metrics::OUTCOME_CANCELLED);
                Poll::Ready(Err(ClientError::Cancelled))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for Cancelable<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.handle.cancel();
        debug!(endpoint = self.endpoint, "Request dropped before completion");
        metrics::inc_request_outcome(self.endpoint, metrics::OUTCOME_CANCELLED);
    }
}

impl<T> fmt::Debug for Cancelable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancelable")
            .field("endpoint", &self.endpoint)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
