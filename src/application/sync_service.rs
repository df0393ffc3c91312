//! Synchronization service for quotes.
//!
//! Runs sync cycles against the server, posts new quotes, and drives the
//! periodic background sync during an interactive session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::domain::{Quote, Result, SyncReport, MAX_SYNC_INTERVAL_SECS};
use crate::infrastructure::QuoteSource;

use super::quote_store::QuoteStore;

/// Store shared between the foreground commands and the sync task.
pub type SharedStore = Arc<Mutex<QuoteStore>>;

/// Shortest interval the periodic task accepts.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Longest interval the periodic task accepts.
const MAX_INTERVAL: Duration = Duration::from_secs(MAX_SYNC_INTERVAL_SECS);

/// Service for synchronizing the quote store with the server.
pub struct SyncService {
    store: SharedStore,
    remote: Arc<dyn QuoteSource>,
}

impl SyncService {
    /// Create a new sync service.
    #[must_use]
    pub fn new(store: SharedStore, remote: Arc<dyn QuoteSource>) -> Self {
        Self { store, remote }
    }

    /// The store this service writes into.
    #[must_use]
    pub const fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Run one sync cycle.
    ///
    /// The fetch happens without holding the store lock, so anything added
    /// locally while it is in flight is discarded if the server wins. A
    /// network failure is reported, not returned.
    ///
    /// # Errors
    /// Returns error if applying the server data to storage fails.
    pub async fn sync_once(&self) -> Result<SyncReport> {
        tracing::info!("Starting sync...");

        let remote = match self.remote.fetch_quotes().await {
            Ok(quotes) => quotes,
            Err(e) if e.is_network() => {
                tracing::warn!(error = %e, "Sync skipped, server unreachable");
                return Ok(SyncReport::failed(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let (outcome, displayed) = self.store.lock().await.sync_with_remote(remote)?;
        let report = SyncReport::from_outcome(&outcome, displayed);

        tracing::info!(replaced = ?report.replaced, "Sync completed");

        Ok(report)
    }

    /// Post a newly added quote to the server.
    ///
    /// # Errors
    /// Returns `AppError::Network` if the server call fails.
    pub async fn publish(&self, quote: &Quote) -> Result<()> {
        self.remote.post_quote(quote).await
    }

    /// Start syncing every `interval` in the background.
    ///
    /// The first cycle runs one full interval after the call. The interval is
    /// clamped to between one second and one day. Each report is passed to
    /// `on_report`.
    #[must_use]
    pub fn spawn_periodic<F>(self: &Arc<Self>, interval: Duration, on_report: F) -> SyncHandle
    where
        F: Fn(SyncReport) + Send + 'static,
    {
        let interval = interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let service = Arc::clone(self);

        tracing::debug!(interval_secs = interval.as_secs(), "Starting periodic sync");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancelled.cancelled() => break,
                    _ = ticker.tick() => match service.sync_once().await {
                        Ok(report) => on_report(report),
                        Err(e) => tracing::error!(error = %e, "Sync cycle failed"),
                    },
                }
            }

            tracing::debug!("Periodic sync stopped");
        });

        SyncHandle {
            token,
            task: Some(task),
        }
    }
}

/// Handle to the periodic sync task.
///
/// Dropping the handle cancels the task without waiting for it.
pub struct SyncHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Cancel the task and wait for it to exit.
    ///
    /// A cycle already in flight runs to completion first.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Periodic sync task ended abnormally");
            }
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use tokio::sync::{mpsc, Notify};

    use crate::application::quote_store::QUOTES_KEY;
    use crate::domain::AppError;
    use crate::infrastructure::MemoryStore;

    /// Scripted server: replies are consumed in order, then empty lists.
    #[derive(Default)]
    struct FakeSource {
        replies: std::sync::Mutex<VecDeque<Result<Vec<Quote>>>>,
        posted: std::sync::Mutex<Vec<Quote>>,
        fail_posts: bool,
    }

    impl FakeSource {
        fn replying(replies: Vec<Result<Vec<Quote>>>) -> Self {
            Self {
                replies: std::sync::Mutex::new(replies.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn post_quote(&self, quote: &Quote) -> Result<()> {
            if self.fail_posts {
                return Err(offline());
            }
            self.posted.lock().unwrap().push(quote.clone());
            Ok(())
        }
    }

    /// Server whose fetch blocks until released.
    struct GatedSource {
        started: Notify,
        release: Notify,
        reply: Vec<Quote>,
    }

    #[async_trait]
    impl QuoteSource for GatedSource {
        async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.reply.clone())
        }

        async fn post_quote(&self, _quote: &Quote) -> Result<()> {
            Ok(())
        }
    }

    fn offline() -> AppError {
        AppError::Network {
            message: "connection refused".into(),
            source: None,
        }
    }

    fn server_quotes(n: usize) -> Vec<Quote> {
        (0..n).map(|i| Quote::from_server(format!("post {i}"))).collect()
    }

    fn shared_store(local: usize) -> SharedStore {
        let quotes: Vec<Quote> = (0..local)
            .map(|i| Quote::new(&format!("local {i}"), "Life").unwrap())
            .collect();
        let store = QuoteStore::load(
            Box::new(MemoryStore::with_entry(
                QUOTES_KEY,
                serde_json::to_string(&quotes).unwrap(),
            )),
            Box::new(MemoryStore::new()),
        )
        .unwrap();
        Arc::new(Mutex::new(store))
    }

    #[tokio::test]
    async fn test_sync_once_replaces_on_count_mismatch() {
        let service = SyncService::new(
            shared_store(2),
            Arc::new(FakeSource::replying(vec![Ok(server_quotes(3))])),
        );

        let report = service.sync_once().await.unwrap();

        assert_eq!(report.replaced, Some(3));
        let store = service.store().lock().await;
        assert_eq!(store.quotes(), server_quotes(3).as_slice());
        assert_eq!(report.displayed, store.last_displayed().unwrap());
        assert!(report.displayed.is_some());
    }

    #[tokio::test]
    async fn test_sync_once_keeps_local_on_equal_count() {
        let service = SyncService::new(
            shared_store(2),
            Arc::new(FakeSource::replying(vec![Ok(server_quotes(2))])),
        );

        let report = service.sync_once().await.unwrap();

        assert_eq!(report.replaced, None);
        assert!(report.error.is_none());
        assert_eq!(service.store().lock().await.categories(), vec!["Life"]);
    }

    #[tokio::test]
    async fn test_sync_once_network_failure_is_no_update() {
        let service = SyncService::new(
            shared_store(2),
            Arc::new(FakeSource::replying(vec![Err(offline())])),
        );

        let report = service.sync_once().await.unwrap();

        assert!(report.error.is_some());
        assert_eq!(service.store().lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_add_during_fetch_is_lost_when_server_wins() {
        let source = Arc::new(GatedSource {
            started: Notify::new(),
            release: Notify::new(),
            reply: server_quotes(4),
        });
        let service = Arc::new(SyncService::new(shared_store(2), source.clone()));

        let cycle = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.sync_once().await })
        };

        source.started.notified().await;
        service
            .store()
            .lock()
            .await
            .add_quote("Added mid-sync", "Life")
            .unwrap();
        source.release.notify_one();

        let report = cycle.await.unwrap().unwrap();

        assert_eq!(report.replaced, Some(4));
        let store = service.store().lock().await;
        assert!(store.quotes().iter().all(|q| q.text != "Added mid-sync"));
    }

    #[tokio::test]
    async fn test_publish_posts_quote() {
        let source = Arc::new(FakeSource::default());
        let service = SyncService::new(shared_store(0), source.clone());
        let quote = Quote::new("Stay hungry", "Motivation").unwrap();

        service.publish(&quote).await.unwrap();

        assert_eq!(*source.posted.lock().unwrap(), vec![quote]);
    }

    #[tokio::test]
    async fn test_publish_failure_is_network_error() {
        let source = Arc::new(FakeSource {
            fail_posts: true,
            ..FakeSource::default()
        });
        let service = SyncService::new(shared_store(0), source);
        let quote = Quote::new("Stay hungry", "Motivation").unwrap();

        assert!(service.publish(&quote).await.unwrap_err().is_network());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_sync_waits_one_interval_and_stops() {
        let service = Arc::new(SyncService::new(
            shared_store(2),
            Arc::new(FakeSource::replying(vec![Ok(server_quotes(3))])),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = service.spawn_periodic(Duration::from_secs(30), move |report| {
            let _ = tx.send(report);
        });

        let early = tokio::time::timeout(Duration::from_secs(29), rx.recv()).await;
        assert!(early.is_err(), "no sync before the first interval");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.replaced, Some(3));

        handle.stop().await;

        // The report callback (and its sender) is dropped with the task.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_sync_caps_oversized_interval() {
        let service = Arc::new(SyncService::new(
            shared_store(2),
            Arc::new(FakeSource::replying(vec![Ok(server_quotes(3))])),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = service.spawn_periodic(Duration::from_secs(u64::MAX), move |report| {
            let _ = tx.send(report);
        });

        let first = tokio::time::timeout(MAX_INTERVAL + Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.replaced, Some(3));

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_task() {
        let service = Arc::new(SyncService::new(
            shared_store(2),
            Arc::new(FakeSource::default()),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel::<SyncReport>();

        drop(service.spawn_periodic(Duration::from_secs(30), move |report| {
            let _ = tx.send(report);
        }));

        assert!(rx.recv().await.is_none());
        assert_eq!(service.store().lock().await.len(), 2);
    }
}
