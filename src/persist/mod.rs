//! Persistence boundary
//!
//! The simulation hands exactly one [`SessionSummary`] per session to a
//! [`PersistenceSink`], and only at session boundaries, never mid-tick.
//! The [`SummaryRelay`] makes that hand-off fire-and-forget: a bounded
//! channel feeds a worker thread, sink failures divert the summary into a
//! durable bounded FIFO cache on disk, and cached summaries are retried
//! on a later flush. A slow or absent backend can never stall a tick.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::telemetry::summary::SessionSummary;

/// Sink-side failures. All of these are recoverable: the summary is
/// cached locally and retried later.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// A destination for finalized session summaries
pub trait PersistenceSink {
    fn submit(&mut self, summary: &SessionSummary) -> Result<(), SinkError>;
}

/// The zero-backend case: every submission fails and falls back to the
/// local cache
#[derive(Debug, Default)]
pub struct NullSink;

impl PersistenceSink for NullSink {
    fn submit(&mut self, _summary: &SessionSummary) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("no backend configured".to_string()))
    }
}

/// Writes one pretty-printed JSON file per summary into a directory
#[derive(Debug)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PersistenceSink for JsonDirSink {
    fn submit(&mut self, summary: &SessionSummary) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", summary.session_id));
        let contents = serde_json::to_string_pretty(summary)
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        fs::write(&path, contents)?;
        debug!("summary {} written to {}", summary.session_id, path.display());
        Ok(())
    }
}

/// Durable bounded FIFO of summaries awaiting a working backend.
/// One bincode file per summary; file names sort in insertion order.
#[derive(Debug)]
pub struct SummaryCache {
    dir: PathBuf,
    capacity: usize,
    max_file_bytes: u64,
}

impl SummaryCache {
    pub fn new(dir: impl Into<PathBuf>, capacity: usize, max_file_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            capacity,
            max_file_bytes,
        }
    }

    fn pending_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match fs::read_dir(&self.dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|ext| ext == "bin").unwrap_or(false))
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    pub fn len(&self) -> usize {
        self.pending_files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_files().is_empty()
    }

    /// Append a summary, evicting the oldest entries beyond capacity
    pub fn push(&self, summary: &SessionSummary) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let name = format!("{:020}-{}.bin", summary.ended_unix_ms, summary.session_id);
        let bytes = bincode::serde::encode_to_vec(summary, bincode::config::standard())
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        fs::write(self.dir.join(name), bytes)?;

        let files = self.pending_files();
        if files.len() > self.capacity {
            for stale in &files[..files.len() - self.capacity] {
                warn!("summary cache full, dropping oldest entry {}", stale.display());
                let _ = fs::remove_file(stale);
            }
        }
        Ok(())
    }

    /// Retry pending summaries against the sink, oldest first. Stops at
    /// the first failure (the backend is still down). Returns how many
    /// were delivered.
    pub fn drain_into(&self, sink: &mut dyn PersistenceSink) -> usize {
        let mut delivered = 0;
        for path in self.pending_files() {
            let summary = match self.load(&path) {
                Some(summary) => summary,
                None => continue,
            };
            match sink.submit(&summary) {
                Ok(()) => {
                    let _ = fs::remove_file(&path);
                    delivered += 1;
                }
                Err(e) => {
                    debug!("cache retry stopped: {e}");
                    break;
                }
            }
        }
        if delivered > 0 {
            info!("flushed {delivered} cached session summaries");
        }
        delivered
    }

    /// Read one cached file; unreadable or oversized entries are removed
    /// so they cannot wedge the queue
    fn load(&self, path: &Path) -> Option<SessionSummary> {
        match fs::metadata(path) {
            Ok(meta) if meta.len() > self.max_file_bytes => {
                warn!("cached summary {} too large, discarding", path.display());
                let _ = fs::remove_file(path);
                return None;
            }
            Err(_) => return None,
            _ => {}
        }
        let bytes = fs::read(path).ok()?;
        match bincode::serde::decode_from_slice::<SessionSummary, _>(
            &bytes,
            bincode::config::standard(),
        ) {
            Ok((summary, _)) => Some(summary),
            Err(e) => {
                warn!("cached summary {} corrupt ({e}), discarding", path.display());
                let _ = fs::remove_file(path);
                None
            }
        }
    }
}

/// Observable relay state, surfaced to the host as a soft notice only
#[derive(Debug, Clone, Default)]
pub struct RelayStatus {
    pub submitted: u64,
    /// Summaries saved locally after a sink failure
    pub cached: u64,
    pub last_error: Option<String>,
}

enum RelayMsg {
    Submit(Box<SessionSummary>),
}

/// Fire-and-forget hand-off between the session loop and the sink.
/// `dispatch` never blocks; all sink I/O happens on the worker thread.
pub struct SummaryRelay {
    tx: Option<Sender<RelayMsg>>,
    cache: Arc<Mutex<SummaryCache>>,
    status: Arc<Mutex<RelayStatus>>,
    worker: Option<JoinHandle<()>>,
}

impl SummaryRelay {
    pub fn new(
        mut sink: Box<dyn PersistenceSink + Send>,
        cache: SummaryCache,
        channel_capacity: usize,
    ) -> Self {
        let (tx, rx) = bounded::<RelayMsg>(channel_capacity);
        let cache = Arc::new(Mutex::new(cache));
        let status = Arc::new(Mutex::new(RelayStatus::default()));

        let worker_cache = Arc::clone(&cache);
        let worker_status = Arc::clone(&status);
        let worker = std::thread::spawn(move || {
            while let Ok(RelayMsg::Submit(summary)) = rx.recv() {
                // Earlier failures get their retry before the new summary
                let flushed = worker_cache.lock().drain_into(sink.as_mut());
                if flushed > 0 {
                    worker_status.lock().submitted += flushed as u64;
                }

                match sink.submit(&summary) {
                    Ok(()) => {
                        let mut status = worker_status.lock();
                        status.submitted += 1;
                        status.last_error = None;
                    }
                    Err(e) => {
                        warn!("persistence unavailable ({e}), summary saved locally");
                        let mut status = worker_status.lock();
                        status.last_error = Some(e.to_string());
                        if let Err(cache_err) = worker_cache.lock().push(&summary) {
                            warn!("summary cache write failed: {cache_err}");
                        } else {
                            status.cached += 1;
                        }
                    }
                }
            }
        });

        Self {
            tx: Some(tx),
            cache,
            status,
            worker: Some(worker),
        }
    }

    /// Queue a summary for submission. Never blocks: if the channel is
    /// full or the worker is gone, the summary goes straight to the
    /// local cache.
    pub fn dispatch(&self, summary: SessionSummary) {
        let Some(tx) = &self.tx else {
            self.cache_directly(summary);
            return;
        };
        match tx.try_send(RelayMsg::Submit(Box::new(summary))) {
            Ok(()) => {}
            Err(TrySendError::Full(RelayMsg::Submit(summary)))
            | Err(TrySendError::Disconnected(RelayMsg::Submit(summary))) => {
                warn!("relay saturated, caching summary locally");
                self.cache_directly(*summary);
            }
        }
    }

    fn cache_directly(&self, summary: SessionSummary) {
        if let Err(e) = self.cache.lock().push(&summary) {
            warn!("summary cache write failed: {e}");
        } else {
            self.status.lock().cached += 1;
        }
    }

    pub fn status(&self) -> RelayStatus {
        self.status.lock().clone()
    }

    pub fn pending_cached(&self) -> usize {
        self.cache.lock().len()
    }
}

impl Drop for SummaryRelay {
    fn drop(&mut self) {
        // Disconnect the channel so the worker drains and exits
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::summary::{summarize, EndReason, SessionMeta};
    use std::time::Duration;
    use uuid::Uuid;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("summit-duel-{tag}-{}", Uuid::new_v4()))
    }

    fn sample_summary(ended_ms: u64) -> SessionSummary {
        let meta = SessionMeta {
            id: Uuid::new_v4(),
            started_unix_ms: ended_ms.saturating_sub(60_000),
        };
        summarize(&meta, EndReason::TickLimit, ended_ms, 600, 10.0, &[])
    }

    /// Sink that records delivered session ids
    struct VecSink {
        delivered: Arc<Mutex<Vec<Uuid>>>,
    }

    impl PersistenceSink for VecSink {
        fn submit(&mut self, summary: &SessionSummary) -> Result<(), SinkError> {
            self.delivered.lock().push(summary.session_id);
            Ok(())
        }
    }

    fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("condition not reached in time");
    }

    #[test]
    fn test_null_sink_always_fails() {
        let mut sink = NullSink;
        assert!(matches!(
            sink.submit(&sample_summary(1)),
            Err(SinkError::Unavailable(_))
        ));
    }

    #[test]
    fn test_json_dir_sink_writes_file() {
        let dir = scratch_dir("json");
        let mut sink = JsonDirSink::new(&dir);
        let summary = sample_summary(1);
        sink.submit(&summary).unwrap();

        let path = dir.join(format!("{}.json", summary.session_id));
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = scratch_dir("cache");
        let cache = SummaryCache::new(&dir, 8, 1024 * 1024);
        cache.push(&sample_summary(1)).unwrap();
        cache.push(&sample_summary(2)).unwrap();
        assert_eq!(cache.len(), 2);

        let delivered = Arc::new(Mutex::new(Vec::new()));
        let mut sink = VecSink {
            delivered: Arc::clone(&delivered),
        };
        assert_eq!(cache.drain_into(&mut sink), 2);
        assert!(cache.is_empty());
        assert_eq!(delivered.lock().len(), 2);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cache_is_bounded_fifo() {
        let dir = scratch_dir("bounded");
        let cache = SummaryCache::new(&dir, 2, 1024 * 1024);
        for ended in 1..=4u64 {
            cache.push(&sample_summary(ended)).unwrap();
        }
        assert_eq!(cache.len(), 2);

        // Oldest files were evicted: remaining names carry the newest
        // timestamps
        let files = cache.pending_files();
        for file in files {
            let name = file.file_name().unwrap().to_string_lossy().to_string();
            assert!(
                !name.starts_with(&format!("{:020}", 1)) && !name.starts_with(&format!("{:020}", 2)),
                "old entry survived: {name}"
            );
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_drain_stops_on_failure() {
        let dir = scratch_dir("stop");
        let cache = SummaryCache::new(&dir, 8, 1024 * 1024);
        cache.push(&sample_summary(1)).unwrap();
        let mut sink = NullSink;
        assert_eq!(cache.drain_into(&mut sink), 0);
        assert_eq!(cache.len(), 1, "entries survive a failed retry");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_relay_delivers_to_working_sink() {
        let dir = scratch_dir("relay-ok");
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = VecSink {
            delivered: Arc::clone(&delivered),
        };
        let relay = SummaryRelay::new(
            Box::new(sink),
            SummaryCache::new(&dir, 8, 1024 * 1024),
            4,
        );

        relay.dispatch(sample_summary(1));
        wait_until(|| relay.status().submitted == 1);
        assert_eq!(relay.pending_cached(), 0);
        drop(relay);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_relay_caches_on_sink_failure() {
        let dir = scratch_dir("relay-fail");
        let relay = SummaryRelay::new(
            Box::new(NullSink),
            SummaryCache::new(&dir, 8, 1024 * 1024),
            4,
        );

        relay.dispatch(sample_summary(1));
        wait_until(|| relay.status().cached == 1);
        assert_eq!(relay.pending_cached(), 1);
        assert!(relay.status().last_error.is_some());
        drop(relay);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cached_summaries_flush_on_later_session() {
        let dir = scratch_dir("relay-flush");

        // First session: backend down, summary cached
        {
            let relay = SummaryRelay::new(
                Box::new(NullSink),
                SummaryCache::new(&dir, 8, 1024 * 1024),
                4,
            );
            relay.dispatch(sample_summary(1));
            wait_until(|| relay.status().cached == 1);
        }

        // Later session: backend is back, pending entry flushes before
        // the new summary
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = VecSink {
            delivered: Arc::clone(&delivered),
        };
        let relay = SummaryRelay::new(
            Box::new(sink),
            SummaryCache::new(&dir, 8, 1024 * 1024),
            4,
        );
        relay.dispatch(sample_summary(2));
        wait_until(|| delivered.lock().len() == 2);
        assert_eq!(relay.pending_cached(), 0);
        drop(relay);
        let _ = fs::remove_dir_all(&dir);
    }
}
