use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use super::fs;
use super::key::{CacheKey, CacheNamespace};

/// Errors surfaced by [`ContentAddressedCache`].
///
/// `E` is the error type of the compute function. Every variant is `Clone`
/// so a single failure can be handed to all coalesced waiters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError<E> {
    #[error("Cache I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
    #[error("Failed to derive cache key: {0}")]
    Key(String),
    #[error("Cache computation aborted: {0}")]
    Aborted(String),
    #[error(transparent)]
    Compute(E),
}

impl<E> CacheError<E> {
    fn io(path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// In-memory LRU tier.
    Memory,
    /// Existing file in the namespace directory.
    Disk,
    /// Joined a computation another caller had already started.
    Coalesced,
    /// This call started the computation.
    Computed,
}

impl CacheOutcome {
    pub fn hit(self) -> bool {
        !matches!(self, CacheOutcome::Computed)
    }
}

/// Result of [`ContentAddressedCache::get_or_compute`].
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub key: CacheKey,
    pub payload: Bytes,
    pub outcome: CacheOutcome,
}

impl CacheLookup {
    pub fn hit(&self) -> bool {
        self.outcome.hit()
    }
}

type SharedCompute<E> = Shared<BoxFuture<'static, Result<Bytes, CacheError<E>>>>;

struct CacheState<E> {
    memory: Option<LruCache<CacheKey, Bytes>>,
    in_flight: HashMap<CacheKey, SharedCompute<E>>,
}

impl<E> CacheState<E> {
    fn memory_get(&mut self, key: &CacheKey) -> Option<Bytes> {
        self.memory.as_mut()?.get(key).cloned()
    }

    fn touch(&mut self, key: CacheKey, payload: Bytes) {
        if let Some(memory) = self.memory.as_mut() {
            memory.put(key, payload);
        }
    }
}

struct CacheInner<E> {
    dir: PathBuf,
    namespace: CacheNamespace,
    state: Mutex<CacheState<E>>,
}

/// Removes the in-flight entry when the computation task ends, including by
/// panic.
struct InFlightGuard<E> {
    inner: Arc<CacheInner<E>>,
    key: CacheKey,
}

impl<E> Drop for InFlightGuard<E> {
    fn drop(&mut self) {
        self.inner.state.lock().in_flight.remove(&self.key);
    }
}

/// Two-tier content-addressed byte cache with single-flight computation.
///
/// Lookups go memory → disk → in-flight map. On a full miss the compute
/// function runs on its own task, its output is written atomically to
/// `<root>/<namespace>/<key>.<ext>` and every caller that asked for the same
/// key in the meantime receives the same bytes (or the same error).
/// Failures are never stored; the next call computes again.
///
/// Files are create-only. The cache never deletes or rewrites an entry it
/// has written.
pub struct ContentAddressedCache<E> {
    inner: Arc<CacheInner<E>>,
}

impl<E> Clone for ContentAddressedCache<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> ContentAddressedCache<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Create a cache rooted at `root`. A `memory_capacity` of zero disables
    /// the memory tier.
    pub fn new(root: impl AsRef<Path>, namespace: CacheNamespace, memory_capacity: usize) -> Self {
        let dir = root.as_ref().join(namespace.relative_dir());
        info!(
            "Cache namespace {} at {:?} (memory entries: {})",
            namespace.kind(),
            dir,
            memory_capacity
        );
        Self {
            inner: Arc::new(CacheInner {
                dir,
                namespace,
                state: Mutex::new(CacheState {
                    memory: NonZeroUsize::new(memory_capacity).map(LruCache::new),
                    in_flight: HashMap::new(),
                }),
            }),
        }
    }

    pub fn namespace(&self) -> &CacheNamespace {
        &self.inner.namespace
    }

    /// Namespace directory holding this cache's files.
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn key_for<D: Serialize + ?Sized>(&self, descriptor: &D) -> Result<CacheKey, CacheError<E>> {
        self.inner
            .namespace
            .key(descriptor)
            .map_err(|e| CacheError::Key(e.to_string()))
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.inner.dir.join(self.inner.namespace.file_name(key))
    }

    /// True when `key` is held in the memory tier. Does not affect recency.
    pub fn is_memory_resident(&self, key: &CacheKey) -> bool {
        self.inner
            .state
            .lock()
            .memory
            .as_ref()
            .is_some_and(|m| m.contains(key))
    }

    /// Drop `key` from the memory tier. The file on disk is left alone.
    pub fn evict_memory(&self, key: &CacheKey) {
        if let Some(memory) = self.inner.state.lock().memory.as_mut() {
            memory.pop(key);
        }
    }

    pub fn memory_len(&self) -> usize {
        self.inner
            .state
            .lock()
            .memory
            .as_ref()
            .map_or(0, LruCache::len)
    }

    pub fn in_flight_len(&self) -> usize {
        self.inner.state.lock().in_flight.len()
    }

    /// Fetch the payload for `descriptor`, computing it at most once.
    pub async fn get_or_compute<D, F, Fut>(
        &self,
        descriptor: &D,
        compute: F,
    ) -> Result<CacheLookup, CacheError<E>>
    where
        D: Serialize + ?Sized,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Bytes, E>> + Send + 'static,
    {
        let key = self.key_for(descriptor)?;
        self.get_or_compute_key(key, compute).await
    }

    /// Same as [`Self::get_or_compute`] with an already derived key.
    pub async fn get_or_compute_key<F, Fut>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<CacheLookup, CacheError<E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Bytes, E>> + Send + 'static,
    {
        if let Some(payload) = self.inner.state.lock().memory_get(&key) {
            return Ok(self.finish(key, payload, CacheOutcome::Memory));
        }

        let path = self.path_for(&key);
        if let Some(payload) = fs::read_if_exists(&path)
            .await
            .map_err(|e| CacheError::io(&path, e))?
        {
            self.inner.state.lock().touch(key.clone(), payload.clone());
            return Ok(self.finish(key, payload, CacheOutcome::Disk));
        }

        let (pending, outcome) = {
            let mut state = self.inner.state.lock();
            // A computation may have finished between the disk read and here.
            if let Some(payload) = state.memory_get(&key) {
                drop(state);
                return Ok(self.finish(key, payload, CacheOutcome::Memory));
            }
            match state.in_flight.get(&key) {
                Some(pending) => (pending.clone(), CacheOutcome::Coalesced),
                None => {
                    let pending = self.spawn_compute(key.clone(), path, compute);
                    state.in_flight.insert(key.clone(), pending.clone());
                    (pending, CacheOutcome::Computed)
                }
            }
        };

        let payload = pending.await?;
        Ok(self.finish(key, payload, outcome))
    }

    fn spawn_compute<F, Fut>(&self, key: CacheKey, path: PathBuf, compute: F) -> SharedCompute<E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Bytes, E>> + Send + 'static,
    {
        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            key,
        };

        let task = tokio::spawn(async move {
            let result: Result<Bytes, CacheError<E>> = async {
                // Another computation may have written the file and left the
                // in-flight map after this caller's disk miss. Files are
                // create-only, so use it instead of computing again.
                if let Some(payload) = fs::read_if_exists(&path)
                    .await
                    .map_err(|e| CacheError::io(&path, e))?
                {
                    debug!(path = ?path, "Entry appeared on disk before compute");
                    return Ok(payload);
                }
                let payload = compute().await.map_err(CacheError::Compute)?;
                fs::write_atomic(&path, &payload)
                    .await
                    .map_err(|e| CacheError::io(&path, e))?;
                Ok::<_, CacheError<E>>(payload)
            }
            .await;

            if let Ok(payload) = &result {
                guard
                    .inner
                    .state
                    .lock()
                    .touch(guard.key.clone(), payload.clone());
            }
            drop(guard);
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(CacheError::Aborted(e.to_string())),
            }
        }
        .boxed()
        .shared()
    }

    fn finish(&self, key: CacheKey, payload: Bytes, outcome: CacheOutcome) -> CacheLookup {
        debug!(
            namespace = self.inner.namespace.kind(),
            key = %key,
            ?outcome,
            bytes = payload.len(),
            "Cache lookup"
        );
        CacheLookup {
            key,
            payload,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, thiserror::Error)]
    #[error("synthetic failure")]
    struct Boom;

    fn cache(root: &Path, capacity: usize) -> ContentAddressedCache<Boom> {
        let ns = CacheNamespace::new("test", "v1", &"params", "bin").unwrap();
        ContentAddressedCache::new(root, ns, capacity)
    }

    fn counting(
        counter: &Arc<AtomicUsize>,
        payload: &'static [u8],
    ) -> impl FnOnce() -> futures::future::Ready<Result<Bytes, Boom>> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(Bytes::from_static(payload)))
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path(), 8);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_compute("cat", counting(&calls, b"meow")).await.unwrap();
        assert_eq!(first.outcome, CacheOutcome::Computed);
        assert!(!first.hit());

        let second = cache.get_or_compute("cat", counting(&calls, b"other")).await.unwrap();
        assert_eq!(second.outcome, CacheOutcome::Memory);
        assert!(second.hit());
        assert_eq!(first.payload, second.payload);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn test_disk_tier_survives_restart() {
        let dir = tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache(dir.path(), 8)
            .get_or_compute("cat", counting(&calls, b"meow"))
            .await
            .unwrap();
        assert!(cache(dir.path(), 8).path_for(&first.key).exists());

        let reopened = cache(dir.path(), 8);
        let second = reopened
            .get_or_compute("cat", counting(&calls, b"other"))
            .await
            .unwrap();
        assert_eq!(second.outcome, CacheOutcome::Disk);
        assert_eq!(&second.payload[..], b"meow");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(reopened.is_memory_resident(&second.key));
    }

    #[tokio::test]
    async fn test_memory_disabled() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path(), 0);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_compute("cat", counting(&calls, b"meow")).await.unwrap();
        let again = cache.get_or_compute("cat", counting(&calls, b"meow")).await.unwrap();
        assert_eq!(again.outcome, CacheOutcome::Disk);
        assert_eq!(cache.memory_len(), 0);
    }

    #[tokio::test]
    async fn test_lru_eviction_and_promotion() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path(), 2);
        let calls = Arc::new(AtomicUsize::new(0));

        let a = cache.get_or_compute("a", counting(&calls, b"a")).await.unwrap().key;
        let b = cache.get_or_compute("b", counting(&calls, b"b")).await.unwrap().key;

        // Touch "a" so "b" becomes least recently used.
        let touched = cache.get_or_compute("a", counting(&calls, b"a")).await.unwrap();
        assert_eq!(touched.outcome, CacheOutcome::Memory);

        let c = cache.get_or_compute("c", counting(&calls, b"c")).await.unwrap().key;
        assert!(cache.is_memory_resident(&a));
        assert!(!cache.is_memory_resident(&b));
        assert!(cache.is_memory_resident(&c));
        assert_eq!(cache.memory_len(), 2);

        let b_again = cache.get_or_compute("b", counting(&calls, b"b")).await.unwrap();
        assert_eq!(b_again.outcome, CacheOutcome::Disk);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_evict_memory_keeps_disk_entry() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path(), 8);
        let calls = Arc::new(AtomicUsize::new(0));

        let key = cache.get_or_compute("cat", counting(&calls, b"meow")).await.unwrap().key;
        cache.evict_memory(&key);
        assert!(!cache.is_memory_resident(&key));

        let again = cache.get_or_compute("cat", counting(&calls, b"meow")).await.unwrap();
        assert_eq!(again.outcome, CacheOutcome::Disk);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_computation() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path(), 8);
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(tokio::sync::Notify::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute("slow", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        gate.notified().await;
                        Ok::<_, Boom>(Bytes::from_static(b"shared payload"))
                    })
                    .await
            }));
        }

        while cache.in_flight_len() == 0 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        gate.notify_one();

        let mut computed = 0;
        for handle in handles {
            let lookup = handle.await.unwrap().unwrap();
            assert_eq!(&lookup.payload[..], b"shared payload");
            if lookup.outcome == CacheOutcome::Computed {
                computed += 1;
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(computed, 1);
        assert_eq!(cache.in_flight_len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_memory_disabled_still_computes_once() {
        for round in 0..50 {
            let dir = tempdir().unwrap();
            let cache = cache(dir.path(), 0);
            let calls = Arc::new(AtomicUsize::new(0));

            let mut handles = Vec::new();
            for _ in 0..32 {
                let cache = cache.clone();
                let calls = Arc::clone(&calls);
                handles.push(tokio::spawn(async move {
                    cache.get_or_compute("k", counting(&calls, b"payload")).await
                }));
            }
            for handle in handles {
                let lookup = handle.await.unwrap().unwrap();
                assert_eq!(&lookup.payload[..], b"payload");
            }
            assert_eq!(calls.load(Ordering::SeqCst), 1, "round {round}");
            assert_eq!(cache.in_flight_len(), 0);
        }
    }

    #[tokio::test]
    async fn test_compute_skipped_when_file_already_written() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path(), 0);
        let calls = Arc::new(AtomicUsize::new(0));

        let key = cache.key_for("cat").unwrap();
        let path = cache.path_for(&key);
        fs::write_atomic(&path, b"first").await.unwrap();

        let payload = cache
            .spawn_compute(key, path.clone(), counting(&calls, b"second"))
            .await
            .unwrap();
        assert_eq!(&payload[..], b"first");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path(), 8);

        let err = cache
            .get_or_compute("cat", || async { Err::<Bytes, _>(Boom) })
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Compute(Boom)));
        assert_eq!(cache.in_flight_len(), 0);
        assert_eq!(cache.memory_len(), 0);

        let key = cache.key_for("cat").unwrap();
        assert!(!cache.path_for(&key).exists());

        let calls = Arc::new(AtomicUsize::new(0));
        let retry = cache.get_or_compute("cat", counting(&calls, b"meow")).await.unwrap();
        assert_eq!(retry.outcome, CacheOutcome::Computed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disk_error_propagates() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("root");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let cache = cache(&blocker, 8);
        let calls = Arc::new(AtomicUsize::new(0));

        let err = cache
            .get_or_compute("cat", counting(&calls, b"meow"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
        assert_eq!(cache.memory_len(), 0);
    }
}
