use crate::feed::FeedState;

pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Decides when the sentinel row below the last rendered item should pull
/// in the next older page, replacing any manual "load more" interaction.
#[derive(Debug, Clone, Copy)]
pub struct SentinelObserver {
    threshold: f64,
}

impl SentinelObserver {
    /// `threshold` is the visible fraction of the sentinel that triggers a
    /// fetch. Values outside `[0, 1]` fall back to fully-visible with a
    /// warning rather than failing the view.
    pub fn new(threshold: f64) -> Self {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(
                threshold,
                "visibility threshold outside [0, 1], using {}",
                DEFAULT_THRESHOLD
            );
            return Self {
                threshold: DEFAULT_THRESHOLD,
            };
        }

        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True when the sentinel is sufficiently visible, an older page may
    /// still exist, and no fetch is already outstanding. The driver
    /// re-evaluates this with the last reported fraction every time a fetch
    /// completes, so a sentinel still on screen retriggers immediately.
    pub fn should_trigger(&self, visible_fraction: f64, state: &FeedState) -> bool {
        visible_fraction >= self.threshold && state.has_more() && !state.is_loading()
    }
}

impl Default for SentinelObserver {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedState;

    #[test]
    fn out_of_range_threshold_falls_back_to_default() {
        assert_eq!(SentinelObserver::new(1.5).threshold(), DEFAULT_THRESHOLD);
        assert_eq!(SentinelObserver::new(-0.1).threshold(), DEFAULT_THRESHOLD);
        assert_eq!(SentinelObserver::new(0.5).threshold(), 0.5);
    }

    #[test]
    fn triggers_only_when_visible_and_idle_with_more() {
        let observer = SentinelObserver::new(1.0);
        let mut state = FeedState::new(2);

        assert!(observer.should_trigger(1.0, &state));
        assert!(!observer.should_trigger(0.5, &state));

        // outstanding fetch suppresses the trigger
        state.begin_page_fetch().unwrap();
        assert!(!observer.should_trigger(1.0, &state));

        // terminal pagination suppresses it for good
        let _ = state.apply_page(Ok(Vec::new()));
        assert!(!observer.should_trigger(1.0, &state));
    }
}
