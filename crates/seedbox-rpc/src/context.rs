//! Per-call cancellation and deadline context.
//!
//! Every client operation takes a [`CallContext`]. The context races the
//! in-flight HTTP exchange against its cancellation token and its deadline;
//! when either fires first, the request future is dropped (which aborts the
//! connection) and the call fails with [`RpcError::Cancelled`] or
//! [`RpcError::DeadlineExceeded`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::RpcError;

/// Cancellation token plus optional deadline for one or more calls.
///
/// Cloning shares the token: cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A fresh context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A fresh context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child context: cancelled when `self` is, and expiring at the
    /// earlier of the parent's deadline and `timeout` from now.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been called on this context or a parent.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The instant after which calls fail with `DeadlineExceeded`.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token, for wiring into other cancellation sources.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Drive `fut` to completion unless the context is cancelled or expires first.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T, RpcError>
    where
        F: Future<Output = Result<T, RpcError>>,
    {
        if self.token.is_cancelled() {
            return Err(RpcError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(RpcError::DeadlineExceeded);
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(RpcError::Cancelled),
            _ = expiry => Err(RpcError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = CallContext::background();
        let value = ctx.guard(async { Ok::<_, RpcError>(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(ctx.deadline().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let ctx = CallContext::background();
        ctx.cancel();
        let result = ctx.guard(async { Ok::<_, RpcError>(()) }).await;
        assert!(matches!(result, Err(RpcError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_future() {
        let ctx = CallContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = ctx
            .guard(async {
                std::future::pending::<()>().await;
                Ok::<_, RpcError>(())
            })
            .await;
        assert!(matches!(result, Err(RpcError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let result = ctx
            .guard(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, RpcError>(())
            })
            .await;
        assert!(matches!(result, Err(RpcError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_child_inherits_cancellation() {
        let parent = CallContext::background();
        let child = parent.child_with_timeout(Duration::from_secs(30));
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_keeps_earlier_parent_deadline() {
        let parent = CallContext::with_timeout(Duration::from_secs(1));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let result = ctx
            .guard(async { Err::<(), _>(RpcError::MissingSessionToken) })
            .await;
        assert!(matches!(result, Err(RpcError::MissingSessionToken)));
    }
}
