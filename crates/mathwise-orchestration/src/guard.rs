//! Timeout wrapper for collaborator calls.
//!
//! Collaborators are synchronous and may block indefinitely. [`CallGuard`]
//! runs each call on the blocking pool of a private tokio runtime and stops
//! waiting after the configured timeout. A call that times out keeps running
//! in the background; its result is discarded.
//!
//! `call` blocks the current thread. From inside an async context the wait
//! happens on a scoped helper thread, since the private runtime cannot be
//! driven from a thread that already runs one.

use std::thread;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::warn;

use mathwise_core::errors::{CollaboratorError, MathwiseError, MathwiseResult};

pub struct CallGuard {
    runtime: Option<Runtime>,
    timeout: Duration,
}

impl CallGuard {
    pub fn new(timeout: Duration) -> MathwiseResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mathwise-guard")
            .enable_time()
            .build()
            .map_err(|e| CollaboratorError::Failed {
                agent: "call_guard".to_string(),
                reason: format!("could not start runtime: {e}"),
            })?;
        Ok(Self {
            runtime: Some(runtime),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `f` with the guard's timeout.
    ///
    /// Errors returned by `f` are kept when they already are collaborator
    /// errors and wrapped as [`CollaboratorError::Failed`] otherwise.
    pub fn call<T, F>(&self, agent: &str, f: F) -> Result<T, CollaboratorError>
    where
        T: Send + 'static,
        F: FnOnce() -> MathwiseResult<T> + Send + 'static,
    {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(CollaboratorError::Failed {
                agent: agent.to_string(),
                reason: "call guard is shut down".to_string(),
            });
        };

        let limit = self.timeout;
        let timed =
            async move { tokio::time::timeout(limit, tokio::task::spawn_blocking(f)).await };
        let outcome = if Handle::try_current().is_ok() {
            thread::scope(|scope| scope.spawn(move || runtime.block_on(timed)).join())
                .map_err(|_| CollaboratorError::Panicked {
                    agent: agent.to_string(),
                })?
        } else {
            runtime.block_on(timed)
        };

        match outcome {
            Err(_elapsed) => {
                let after_ms = limit.as_millis() as u64;
                warn!(agent = %agent, after_ms, "collaborator timed out");
                Err(CollaboratorError::Timeout {
                    agent: agent.to_string(),
                    after_ms,
                })
            }
            Ok(Err(join_error)) if join_error.is_panic() => Err(CollaboratorError::Panicked {
                agent: agent.to_string(),
            }),
            Ok(Err(join_error)) => Err(CollaboratorError::Failed {
                agent: agent.to_string(),
                reason: join_error.to_string(),
            }),
            Ok(Ok(Err(MathwiseError::CollaboratorError(e)))) => Err(e),
            Ok(Ok(Err(e))) => Err(CollaboratorError::Failed {
                agent: agent.to_string(),
                reason: e.to_string(),
            }),
            Ok(Ok(Ok(value))) => Ok(value),
        }
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        // Abandoned blocking calls must not hold up the owner.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
