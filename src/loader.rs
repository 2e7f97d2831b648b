use crate::codec::{CodecHandle, CodecSource};
use crate::error::CodecError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

type LoadFuture = Shared<BoxFuture<'static, Result<CodecHandle, CodecError>>>;

/// Where the loader stands. Observable for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    NotLoaded,
    Loading,
    Loaded,
    LoadFailed,
}

enum LoaderState {
    NotLoaded,
    Loading { attempt: u64, future: LoadFuture },
    Loaded(CodecHandle),
    LoadFailed(CodecError),
}

/// Acquires the codec at most once at a time and caches it after success.
///
/// Concurrent callers share the in-flight attempt. A failed attempt is not
/// sticky: the next call starts a fresh one. No timeout is applied, so a
/// source that never resolves keeps every waiter pending.
pub struct CodecLoader {
    source: Arc<dyn CodecSource>,
    state: Mutex<LoaderState>,
    attempts: AtomicU64,
}

impl CodecLoader {
    pub fn new(source: Arc<dyn CodecSource>) -> Self {
        Self {
            source,
            state: Mutex::new(LoaderState::NotLoaded),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn status(&self) -> LoaderStatus {
        match &*self.lock_state() {
            LoaderState::NotLoaded => LoaderStatus::NotLoaded,
            LoaderState::Loading { .. } => LoaderStatus::Loading,
            LoaderState::Loaded(_) => LoaderStatus::Loaded,
            LoaderState::LoadFailed(_) => LoaderStatus::LoadFailed,
        }
    }

    /// Error from the most recent attempt, while the loader sits in `LoadFailed`.
    pub fn last_failure(&self) -> Option<CodecError> {
        match &*self.lock_state() {
            LoaderState::LoadFailed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Number of load attempts issued against the source so far.
    pub fn load_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn ensure_loaded(&self) -> Result<CodecHandle, CodecError> {
        let (attempt, future) = {
            let mut state = self.lock_state();
            match &*state {
                LoaderState::Loaded(handle) => return Ok(Arc::clone(handle)),
                LoaderState::Loading { attempt, future } => {
                    debug!(attempt, "joining in-flight codec load");
                    (*attempt, future.clone())
                }
                LoaderState::NotLoaded | LoaderState::LoadFailed(_) => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    info!(attempt, "loading codec");
                    let source = Arc::clone(&self.source);
                    let future = async move {
                        source
                            .load()
                            .await
                            .map_err(|e| CodecError::CodecUnavailable(format!("{:#}", e)))
                    }
                    .boxed()
                    .shared();
                    *state = LoaderState::Loading {
                        attempt,
                        future: future.clone(),
                    };
                    (attempt, future)
                }
            }
        };

        let outcome = future.await;
        self.settle(attempt, &outcome);
        outcome
    }

    /// Records the outcome of `attempt`, unless a newer attempt has taken over.
    fn settle(&self, attempt: u64, outcome: &Result<CodecHandle, CodecError>) {
        let mut state = self.lock_state();
        let current = matches!(&*state, LoaderState::Loading { attempt: a, .. } if *a == attempt);
        if !current {
            return;
        }
        *state = match outcome {
            Ok(handle) => {
                info!(attempt, codec = handle.name(), "codec loaded");
                LoaderState::Loaded(Arc::clone(handle))
            }
            Err(err) => {
                warn!(attempt, error = %err, "codec load failed");
                LoaderState::LoadFailed(err.clone())
            }
        };
    }

    fn lock_state(&self) -> MutexGuard<'_, LoaderState> {
        // The state is always left consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for CodecLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecLoader")
            .field("status", &self.status())
            .field("attempts", &self.load_attempts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::NativeCodec;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Fails the first `failures` loads, then succeeds after a short delay.
    struct FlakySource {
        calls: AtomicUsize,
        failures: usize,
    }

    impl FlakySource {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
            }
        }
    }

    #[async_trait]
    impl CodecSource for FlakySource {
        async fn load(&self) -> anyhow::Result<CodecHandle> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if call < self.failures {
                anyhow::bail!("script host unreachable");
            }
            Ok(Arc::new(NativeCodec))
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let source = Arc::new(FlakySource::new(0));
        let loader = CodecLoader::new(source.clone());

        let results =
            futures::future::join_all((0..8).map(|_| loader.ensure_loaded())).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.load_attempts(), 1);
        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
        }
        assert_eq!(loader.status(), LoaderStatus::Loaded);
    }

    #[tokio::test]
    async fn test_loaded_codec_is_reused() {
        let source = Arc::new(FlakySource::new(0));
        let loader = CodecLoader::new(source.clone());

        let a = loader.ensure_loaded().await.unwrap();
        let b = loader.ensure_loaded().await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_reaches_all_waiters_then_retries() {
        let source = Arc::new(FlakySource::new(1));
        let loader = CodecLoader::new(source.clone());

        let (a, b) = tokio::join!(loader.ensure_loaded(), loader.ensure_loaded());
        assert!(matches!(a, Err(CodecError::CodecUnavailable(ref m)) if m.contains("unreachable")));
        assert!(matches!(b, Err(CodecError::CodecUnavailable(_))));
        assert_eq!(loader.status(), LoaderStatus::LoadFailed);
        assert!(loader.last_failure().is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        assert!(loader.ensure_loaded().await.is_ok());
        assert_eq!(loader.status(), LoaderStatus::Loaded);
        assert!(loader.last_failure().is_none());
        assert_eq!(loader.load_attempts(), 2);
    }

    #[test]
    fn test_starts_not_loaded() {
        let loader = CodecLoader::new(Arc::new(FlakySource::new(0)));
        assert_eq!(loader.status(), LoaderStatus::NotLoaded);
        assert_eq!(loader.load_attempts(), 0);
    }
}
