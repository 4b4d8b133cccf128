use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::FeedSettings;
use crate::feed::FeedState;
use crate::models::Submission;
use crate::store::SubmissionStore;
use crate::visibility::SentinelObserver;

/// What a mounted view reports to its observer (the UI layer).
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// New rows from a poll tick, newest-first, merged at the head.
    Prepended(Vec<Submission>),
    /// An older page, merged at the tail.
    Appended(Vec<Submission>),
    /// Pagination terminated; no older rows remain.
    EndReached,
    /// An older-page fetch failed and pagination stopped.
    PageFailed(String),
    /// One poll tick failed; polling continues on the next tick.
    PollFailed(String),
}

/// Handle to a mounted feed view.
///
/// Dropping the handle (or calling [`unmount`]) tears the view down: the
/// poll timer stops and anything still in flight is cancelled at its await
/// point without touching state or emitting further updates.
///
/// [`unmount`]: FeedHandle::unmount
pub struct FeedHandle {
    sentinel: mpsc::Sender<f64>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Reports the currently visible fraction of the sentinel row. The view
    /// decides whether that warrants fetching the next older page.
    pub async fn report_visibility(&self, fraction: f64) {
        let _ = self.sentinel.send(fraction).await;
    }

    /// Tears the view down and waits for its task to finish.
    pub async fn unmount(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

/// Mounts a feed view over `store`, scoped to `user_id`.
///
/// Spawns the single task that owns the [`FeedState`] for the lifetime of
/// the view; timer ticks and sentinel reports are the only two events that
/// drive it, and both are handled on that one task, so every merge sees the
/// latest state. Returns the handle and the update stream for the observer.
pub fn mount<S>(
    store: S,
    user_id: i64,
    settings: FeedSettings,
) -> (FeedHandle, mpsc::Receiver<FeedUpdate>)
where
    S: SubmissionStore + Send + Sync + 'static,
{
    let (sentinel_tx, sentinel_rx) = mpsc::channel(16);
    let (updates_tx, updates_rx) = mpsc::channel(64);

    let task = tokio::spawn(run_view(store, user_id, settings, sentinel_rx, updates_tx));

    (
        FeedHandle {
            sentinel: sentinel_tx,
            task: Some(task),
        },
        updates_rx,
    )
}

async fn run_view<S: SubmissionStore>(
    store: S,
    user_id: i64,
    settings: FeedSettings,
    mut sentinel: mpsc::Receiver<f64>,
    updates: mpsc::Sender<FeedUpdate>,
) {
    let mut state = FeedState::new(settings.page_size);
    let observer = SentinelObserver::new(settings.visibility_threshold);

    // First tick lands one full period after mount; until then the view is
    // filled by sentinel-triggered pagination, matching a dashboard that
    // loads its first page as soon as the empty list leaves the sentinel
    // on screen.
    let mut ticker = time::interval_at(
        time::Instant::now() + settings.poll_interval,
        settings.poll_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_fraction: f64 = 0.0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !poll_tick(&store, user_id, &mut state, &updates).await {
                    break;
                }
            }
            report = sentinel.recv() => {
                let Some(fraction) = report else {
                    // handle dropped without unmount; nothing left to serve
                    break;
                };
                last_fraction = fraction;

                // Loop rather than fetch once: when a completed fetch
                // leaves the sentinel still visible (the user is parked at
                // the bottom), the next page starts immediately. Ends on a
                // short page, a failure, or the fraction dropping below
                // the threshold.
                while observer.should_trigger(last_fraction, &state) {
                    if !fetch_older_page(&store, user_id, &mut state, &updates).await {
                        return;
                    }
                }
            }
        }
    }
}

/// One tail-poll round-trip. Fail-soft: a failed tick is reported and the
/// timer keeps running. Returns false when the observer is gone.
async fn poll_tick<S: SubmissionStore>(
    store: &S,
    user_id: i64,
    state: &mut FeedState,
    updates: &mpsc::Sender<FeedUpdate>,
) -> bool {
    let query = state.poll_query();

    match store.newer_than(user_id, query.since).await {
        Ok(rows) => {
            let accepted = state.apply_poll(rows);
            if accepted.is_empty() {
                // nothing new; no update, no re-render
                return true;
            }
            tracing::debug!(count = accepted.len(), "prepended newer submissions");
            updates
                .send(FeedUpdate::Prepended(accepted))
                .await
                .is_ok()
        }
        Err(err) => {
            tracing::warn!(%err, "poll tick failed");
            updates
                .send(FeedUpdate::PollFailed(err.to_string()))
                .await
                .is_ok()
        }
    }
}

/// One guarded older-page round-trip. Fail-closed: a failure stops
/// pagination for the life of the view. Returns false when the observer is
/// gone.
async fn fetch_older_page<S: SubmissionStore>(
    store: &S,
    user_id: i64,
    state: &mut FeedState,
    updates: &mpsc::Sender<FeedUpdate>,
) -> bool {
    let Some(query) = state.begin_page_fetch() else {
        return true;
    };

    let result = store.page_before(user_id, query.limit, query.before).await;

    match state.apply_page(result) {
        Ok(accepted) => {
            if !accepted.is_empty()
                && updates
                    .send(FeedUpdate::Appended(accepted))
                    .await
                    .is_err()
            {
                return false;
            }
            if !state.has_more() {
                tracing::debug!("pagination reached the oldest submission");
                return updates.send(FeedUpdate::EndReached).await.is_ok();
            }
            true
        }
        Err(err) => {
            tracing::warn!(%err, "page fetch failed, stopping pagination");
            updates
                .send(FeedUpdate::PageFailed(err.to_string()))
                .await
                .is_ok()
        }
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod view_tests;
