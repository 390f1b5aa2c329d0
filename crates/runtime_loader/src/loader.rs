//! Session-wide owner of the secondary runtime.
//!
//! Lifecycle: `Absent -> Loading -> Ready | Failed`. A `Failed` loader starts
//! over on the next acquire. While `Loading`, every caller awaits the same
//! shared attempt, so strategies run at most once per attempt.

use crate::host::RuntimeHandle;
use crate::strategy::AcquireStrategy;
use anyhow::anyhow;
use console::{BridgeSender, OutputLog};
use core::any::Any;
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::panic::AssertUnwindSafe;
use futures::future::{BoxFuture, FutureExt as _, Shared};
use log::{error, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Snippet run by [`RuntimeLoader::self_test`].
pub const SELF_TEST_SOURCE: &str = "print('pyodide-test')";

/// Observable loader state, suitable for a status badge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RuntimeStatus {
    Absent,
    Loading,
    Ready,
    Failed,
}

impl RuntimeStatus {
    /// Label shown next to the run button.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Absent => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "error",
        }
    }
}

/// One strategy's failure within an attempt.
#[derive(Clone, Debug)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    pub error: Arc<anyhow::Error>,
}

/// Every strategy of an attempt failed.
///
/// Cloneable so all callers sharing the attempt observe the same error.
#[derive(Clone, Debug)]
pub struct AcquireError {
    failures: Arc<[StrategyFailure]>,
}

impl AcquireError {
    /// Failures in the order the strategies were tried.
    pub fn failures(&self) -> &[StrategyFailure] {
        &self.failures
    }

    /// The error that ended the attempt (from the last strategy tried).
    pub fn last(&self) -> Option<&StrategyFailure> {
        self.failures.last()
    }
}

impl Display for AcquireError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self.failures.split_last() {
            None => formatter.write_str("Failed to load runtime: no strategies configured"),
            Some((last, earlier)) => {
                write!(
                    formatter,
                    "Failed to load runtime ({} strategy): {:#}",
                    last.strategy, last.error
                )?;
                for failure in earlier {
                    write!(
                        formatter,
                        "; {} strategy failed first: {:#}",
                        failure.strategy, failure.error
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl core::error::Error for AcquireError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        let failure = self.last()?;
        Some(&**failure.error)
    }
}

/// Turn a strategy panic into an ordinary failure so the attempt still ends.
fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    anyhow!("strategy panicked: {message}")
}

type Attempt = Shared<BoxFuture<'static, Result<RuntimeHandle, AcquireError>>>;

enum LoaderState {
    Absent,
    Loading(Attempt),
    Ready(RuntimeHandle),
    Failed(AcquireError),
}

struct LoaderInner {
    strategies: Vec<Arc<dyn AcquireStrategy>>,
    state: Mutex<LoaderState>,
    status: watch::Sender<RuntimeStatus>,
    attempts: AtomicUsize,
    log: OutputLog,
    errors: BridgeSender,
}

impl LoaderInner {
    fn state(&self) -> MutexGuard<'_, LoaderState> {
        // State transitions are single assignments; a poisoned guard is still coherent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_strategies(&self) -> Result<RuntimeHandle, AcquireError> {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            let outcome = AssertUnwindSafe(strategy.acquire())
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(panic_error(&*payload)));
            match outcome {
                Ok(handle) => return Ok(handle),
                Err(err) => {
                    warn!("Runtime {} strategy failed: {err:#}", strategy.name());
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        error: Arc::new(err),
                    });
                }
            }
        }
        let err = AcquireError {
            failures: failures.into(),
        };
        error!("{err}");
        Err(err)
    }

    fn finish(&self, outcome: &Result<RuntimeHandle, AcquireError>) {
        let (state, status) = match outcome {
            Ok(handle) => (LoaderState::Ready(Arc::clone(handle)), RuntimeStatus::Ready),
            Err(err) => (LoaderState::Failed(err.clone()), RuntimeStatus::Failed),
        };
        *self.state() = state;
        self.status.send_replace(status);
    }
}

/// Single-flight owner of the session's runtime. Clones share the runtime.
#[derive(Clone)]
pub struct RuntimeLoader {
    inner: Arc<LoaderInner>,
}

impl RuntimeLoader {
    /// `strategies` are tried in order on every attempt. `log` is cleared
    /// before each execution; execution errors are posted through `errors` so
    /// they land after the output the code printed before failing.
    pub fn new(
        strategies: Vec<Arc<dyn AcquireStrategy>>,
        log: OutputLog,
        errors: BridgeSender,
    ) -> Self {
        let (status, _) = watch::channel(RuntimeStatus::Absent);
        Self {
            inner: Arc::new(LoaderInner {
                strategies,
                state: Mutex::new(LoaderState::Absent),
                status,
                attempts: AtomicUsize::new(0),
                log,
                errors,
            }),
        }
    }

    #[inline]
    pub fn status(&self) -> RuntimeStatus {
        *self.inner.status.borrow()
    }

    /// Watch status changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<RuntimeStatus> {
        self.inner.status.subscribe()
    }

    /// Number of acquisition attempts started so far.
    #[inline]
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::Acquire)
    }

    /// The ready runtime, if any, without starting an attempt.
    pub fn handle(&self) -> Option<RuntimeHandle> {
        match &*self.inner.state() {
            LoaderState::Ready(handle) => Some(Arc::clone(handle)),
            LoaderState::Absent | LoaderState::Loading(_) | LoaderState::Failed(_) => None,
        }
    }

    /// The error of the last failed attempt, while the loader is `Failed`.
    pub fn last_error(&self) -> Option<AcquireError> {
        match &*self.inner.state() {
            LoaderState::Failed(err) => Some(err.clone()),
            LoaderState::Absent | LoaderState::Loading(_) | LoaderState::Ready(_) => None,
        }
    }

    fn start_attempt(&self) -> Attempt {
        let inner = Arc::clone(&self.inner);
        let attempt = inner.attempts.fetch_add(1, Ordering::AcqRel) + 1;
        info!("Loading runtime (attempt {attempt})");
        async move {
            let outcome = inner.run_strategies().await;
            inner.finish(&outcome);
            outcome
        }
        .boxed()
        .shared()
    }

    /// Get the runtime, loading it on first use.
    ///
    /// # Errors
    /// Returns the attempt's error when every strategy failed. The loader is
    /// then `Failed` and the next call tries again.
    pub async fn acquire(&self) -> Result<RuntimeHandle, AcquireError> {
        let attempt = {
            let mut state = self.inner.state();
            match &*state {
                LoaderState::Ready(handle) => return Ok(Arc::clone(handle)),
                LoaderState::Loading(attempt) => attempt.clone(),
                LoaderState::Absent | LoaderState::Failed(_) => {
                    let attempt = self.start_attempt();
                    *state = LoaderState::Loading(attempt.clone());
                    self.inner.status.send_replace(RuntimeStatus::Loading);
                    attempt
                }
            }
        };
        attempt.await
    }

    /// Run `source` in the runtime, loading it first if needed.
    ///
    /// The log is cleared once the runtime is available. An error raised by
    /// the code becomes one console line instead of being returned.
    ///
    /// # Errors
    /// Only acquisition failures are returned.
    pub async fn execute(&self, source: &str) -> Result<(), AcquireError> {
        let runtime = self.acquire().await?;
        self.inner.log.clear();
        if let Err(err) = runtime.run(source).await {
            warn!("Runtime execution failed: {err:#}");
            self.inner.errors.post_console(&format!("{err:#}"));
        }
        Ok(())
    }

    /// Run a one-line smoke test through the normal execution path.
    ///
    /// # Errors
    /// Only acquisition failures are returned.
    pub async fn self_test(&self) -> Result<(), AcquireError> {
        self.execute(SELF_TEST_SOURCE).await
    }
}
