use crate::error::StoreError;
use crate::models::Submission;

/// Lifecycle of the older-page fetch.
///
/// `Loading` doubles as the re-entrancy guard: at most one page fetch is
/// outstanding per view, and a second trigger while loading is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Older-page query handed to the store: up to `limit` rows with
/// `id < before`, or the newest rows when `before` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub before: Option<i64>,
    pub limit: u32,
}

/// Tail query handed to the store: all rows with `id > since`, or every
/// row when nothing is loaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollQuery {
    pub since: Option<i64>,
}

/// Client-held state of one mounted feed view.
///
/// `items` is kept strictly descending by id with no duplicates: older
/// pages append at the tail, poll results prepend at the head. The state
/// is rebuilt empty on every mount and never persisted.
///
/// All methods are pure transitions over in-memory state; the view driver
/// performs the store round-trips and applies their results here, so every
/// merge is computed against the state as it is at application time rather
/// than a snapshot captured before the round-trip.
#[derive(Debug, Clone)]
pub struct FeedState {
    items: Vec<Submission>,
    has_more: bool,
    phase: Phase,
    page_size: u32,
}

impl FeedState {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            has_more: true,
            phase: Phase::Idle,
            // a zero page size would never terminate pagination
            page_size: page_size.max(1),
        }
    }

    pub fn items(&self) -> &[Submission] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Starts an older-page fetch, returning the query to run.
    ///
    /// Returns `None` while a fetch is already outstanding or once
    /// pagination has terminated; the caller must not hit the store in
    /// either case.
    pub fn begin_page_fetch(&mut self) -> Option<PageQuery> {
        if self.phase == Phase::Loading || !self.has_more {
            return None;
        }

        self.phase = Phase::Loading;

        Some(PageQuery {
            before: self.items.last().map(|s| s.id),
            limit: self.page_size,
        })
    }

    /// Applies the outcome of the fetch started by [`begin_page_fetch`].
    ///
    /// On success the rows append at the tail and `has_more` is re-derived
    /// from the raw page length: a page shorter than `page_size` (including
    /// empty) is terminal. A full page keeps `has_more` true even when the
    /// store happens to be exhausted; the one extra empty fetch that causes
    /// is then terminal.
    ///
    /// On error the items are left untouched and pagination stops
    /// (fail-closed): a failing page fetch points at a structural problem,
    /// not a transient one worth retrying forever.
    ///
    /// Returns the rows actually merged so the caller can notify observers.
    ///
    /// [`begin_page_fetch`]: FeedState::begin_page_fetch
    pub fn apply_page(
        &mut self,
        result: Result<Vec<Submission>, StoreError>,
    ) -> Result<Vec<Submission>, StoreError> {
        match result {
            Ok(rows) => {
                let full_page = rows.len() == self.page_size as usize;
                let accepted = self.accept_older(rows);

                self.items.extend(accepted.iter().cloned());
                self.has_more = full_page;
                self.phase = Phase::Loaded;

                Ok(accepted)
            }
            Err(err) => {
                self.has_more = false;
                self.phase = Phase::Failed;

                Err(err)
            }
        }
    }

    /// Cursor for the next poll tick: the newest loaded id, or `None` when
    /// the view holds nothing yet (the poll then returns everything and
    /// becomes the initial content).
    pub fn poll_query(&self) -> PollQuery {
        PollQuery {
            since: self.items.first().map(|s| s.id),
        }
    }

    /// Prepends a poll result, newest-first, at the head.
    ///
    /// An empty result mutates nothing. Poll failures never reach this
    /// method: the driver reports them and leaves both the state and the
    /// timer alone (fail-soft, a missed tick is harmless).
    ///
    /// Returns the rows actually merged.
    pub fn apply_poll(&mut self, rows: Vec<Submission>) -> Vec<Submission> {
        if rows.is_empty() {
            return Vec::new();
        }

        let accepted = self.accept_newer(rows);
        self.items.splice(0..0, accepted.iter().cloned());

        accepted
    }

    /// Keeps only rows that can extend the head: strictly descending and
    /// every id above the current newest. A store violating its ordering
    /// contract cannot break the feed invariant.
    fn accept_newer(&self, rows: Vec<Submission>) -> Vec<Submission> {
        let newest = self.items.first().map(|s| s.id);
        let mut accepted = Vec::with_capacity(rows.len());
        let mut previous: Option<i64> = None;

        for row in rows {
            let descending = previous.is_none_or(|p| row.id < p);
            let above_head = newest.is_none_or(|n| row.id > n);
            if descending && above_head {
                previous = Some(row.id);
                accepted.push(row);
            }
        }

        accepted
    }

    /// Counterpart of [`accept_newer`] for the tail: strictly descending
    /// and every id below the current oldest.
    ///
    /// [`accept_newer`]: FeedState::accept_newer
    fn accept_older(&self, rows: Vec<Submission>) -> Vec<Submission> {
        let oldest = self.items.last().map(|s| s.id);
        let mut accepted = Vec::with_capacity(rows.len());
        let mut previous: Option<i64> = None;

        for row in rows {
            let descending = previous.is_none_or(|p| row.id < p);
            let below_tail = oldest.is_none_or(|o| row.id < o);
            if descending && below_tail {
                previous = Some(row.id);
                accepted.push(row);
            }
        }

        accepted
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod feed_tests;
