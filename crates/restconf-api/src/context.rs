// Per-call cancellation and deadline.
//
// Every transport call runs inside a `RequestContext`. The context can be
// cancelled from another task (e.g. on Ctrl-C) and may carry an absolute
// deadline; whichever fires first aborts the in-flight request.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Caller-supplied cancellation token plus optional deadline.
///
/// Cloning shares the token: cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never expires and is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token (typically shared with a signal handler).
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Set an absolute deadline.
    pub fn deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(at);
        self
    }

    /// Set a deadline relative to now.
    pub fn timeout(self, budget: Duration) -> Self {
        self.deadline(Instant::now() + budget)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drive `call` to completion unless the context is cancelled or its
    /// deadline passes first. The losing future is dropped, which aborts
    /// the underlying connection.
    pub(crate) async fn run<T, F>(&self, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(at) => tokio::time::timeout_at(at, call)
                    .await
                    .map_err(|_| Error::DeadlineExceeded)?,
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = bounded => result,
        }
    }
}
