//! Live submission feed for a job-application dashboard.
//!
//! An external automation process appends job applications to a SQLite
//! table; this crate keeps a newest-first, infinitely-scrollable view of
//! that log consistent with it. Older pages load on demand when a sentinel
//! row becomes visible, and a fixed-period poller prepends anything newer
//! than the head of the list.

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod store;
pub mod view;
pub mod visibility;

pub use config::FeedSettings;
pub use error::StoreError;
pub use feed::FeedState;
pub use models::{NewSubmission, Submission};
pub use store::{SqliteStore, SubmissionStore};
pub use view::{mount, FeedHandle, FeedUpdate};
