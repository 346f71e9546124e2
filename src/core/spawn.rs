//! # Executor seam for asynchronous feedback actions.
//!
//! The scheduler never awaits an async action: it hands the future to a [`Spawn`]
//! implementation and moves on. The default, [`TokioSpawner`], uses whichever
//! Tokio runtime is current when the action fires.

use futures::future::BoxFuture;
use tokio::runtime::Handle;

use crate::error::FeedbackError;

/// Runs detached futures on some executor.
pub trait Spawn: Send + Sync + 'static {
    /// Schedules `fut` without waiting for it.
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<(), FeedbackError>;
}

/// Spawns onto the Tokio runtime current at call time.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSpawner;

impl Spawn for TokioSpawner {
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<(), FeedbackError> {
        let handle = Handle::try_current().map_err(|_| FeedbackError::NoExecutor)?;
        drop(handle.spawn(fut));
        Ok(())
    }
}

impl Spawn for Handle {
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<(), FeedbackError> {
        drop(Handle::spawn(self, fut));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn tokio_spawner_without_runtime_reports_no_executor() {
        let res = TokioSpawner.spawn(async {}.boxed());
        assert_eq!(res, Err(FeedbackError::NoExecutor));
    }

    #[tokio::test]
    async fn tokio_spawner_runs_future() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        TokioSpawner
            .spawn(
                async move {
                    let _ = tx.send(7);
                }
                .boxed(),
            )
            .unwrap();
        assert_eq!(rx.await.unwrap(), 7);
    }
}
