use std::time::Duration;

use crate::visibility::DEFAULT_THRESHOLD;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Tuning for one mounted feed view, built once at startup and injected
/// into [`mount`]; there is no module-level configuration.
///
/// [`mount`]: crate::view::mount
#[derive(Debug, Clone, Copy)]
pub struct FeedSettings {
    /// Rows requested per older-page fetch.
    pub page_size: u32,
    /// Period of the tail poller.
    pub poll_interval: Duration,
    /// Sentinel visibility fraction that triggers pagination; out-of-range
    /// values fall back to fully-visible.
    pub visibility_threshold: f64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            visibility_threshold: DEFAULT_THRESHOLD,
        }
    }
}
