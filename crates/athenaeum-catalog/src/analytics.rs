//! View and download counters
//!
//! Tracking never blocks or fails the caller: each event is recorded on a
//! spawned task and errors are only logged. While an event for a given
//! (kind, resource) pair is in flight, further events for the same pair are
//! dropped, which keeps a double click from counting twice.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use athenaeum_api_client::{ApiClient, TrackKind};
use athenaeum_core::models::ResourceId;
use tokio::task::JoinHandle;

/// Destination for analytics events.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, kind: TrackKind, id: &ResourceId) -> anyhow::Result<()>;
}

#[async_trait]
impl AnalyticsSink for ApiClient {
    async fn record(&self, kind: TrackKind, id: &ResourceId) -> anyhow::Result<()> {
        self.track(kind, id).await
    }
}

type InFlight = Arc<Mutex<HashSet<(TrackKind, ResourceId)>>>;

#[derive(Clone)]
pub struct AnalyticsTracker {
    sink: Arc<dyn AnalyticsSink>,
    in_flight: InFlight,
}

impl AnalyticsTracker {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            sink,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn track_view(&self, id: &ResourceId) -> Option<JoinHandle<()>> {
        self.track(TrackKind::View, id)
    }

    pub fn track_download(&self, id: &ResourceId) -> Option<JoinHandle<()>> {
        self.track(TrackKind::Download, id)
    }

    /// Spawn the recording task. Returns `None` when an identical event is
    /// still in flight. Must be called from within a tokio runtime.
    pub fn track(&self, kind: TrackKind, id: &ResourceId) -> Option<JoinHandle<()>> {
        let key = (kind, id.clone());
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        if !inserted {
            tracing::debug!(resource_id = %id, kind = ?kind, "Analytics event already in flight");
            return None;
        }

        let guard = InFlightGuard {
            in_flight: self.in_flight.clone(),
            key,
        };
        let sink = self.sink.clone();
        let id = id.clone();

        Some(tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = sink.record(kind, &id).await {
                tracing::warn!(
                    error = %e,
                    resource_id = %id,
                    kind = ?kind,
                    "Failed to record analytics event"
                );
            }
        }))
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Releases the in-flight slot when the recording task ends, even on panic.
struct InFlightGuard {
    in_flight: InFlight,
    key: (TrackKind, ResourceId),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct GatedSink {
        calls: AtomicUsize,
        release: Notify,
        fail: bool,
    }

    #[async_trait]
    impl AnalyticsSink for GatedSink {
        async fn record(&self, _kind: TrackKind, _id: &ResourceId) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            if self.fail {
                anyhow::bail!("counter endpoint unavailable");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn duplicate_event_is_dropped_while_in_flight() {
        let sink = Arc::new(GatedSink::default());
        let tracker = AnalyticsTracker::new(sink.clone());
        let id = ResourceId::new("r1");

        let first = tracker.track_view(&id).expect("first event spawns");
        assert!(tracker.track_view(&id).is_none());
        // a different kind for the same resource is independent
        let download = tracker.track_download(&id).expect("download spawns");
        assert_eq!(tracker.in_flight_count(), 2);

        while sink.calls.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        sink.release.notify_waiters();
        first.await.unwrap();
        download.await.unwrap();

        assert_eq!(tracker.in_flight_count(), 0);
        assert!(tracker.track_view(&id).is_some());
    }

    #[tokio::test]
    async fn failures_are_swallowed_and_release_the_slot() {
        let sink = Arc::new(GatedSink {
            fail: true,
            ..GatedSink::default()
        });
        let tracker = AnalyticsTracker::new(sink.clone());
        let id = ResourceId::new("r2");

        let handle = tracker.track_download(&id).unwrap();
        while sink.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }
        sink.release.notify_one();
        handle.await.unwrap();

        assert_eq!(tracker.in_flight_count(), 0);
    }
}
