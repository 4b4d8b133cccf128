use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job application recorded by the external submission process.
/// Immutable once written; `id` is assigned by the store and strictly
/// increases in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub company: String,
    pub title: String,
    pub location: String,
    pub recruiter_link: Option<String>,
    pub link: Option<String>,
    pub pdf_path: Option<String>,
}

/// Fields of a submission before the store assigns an id.
/// Only the seeder and tests append rows; in production the table is
/// written by the automation process, not by this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSubmission {
    pub company: String,
    pub title: String,
    pub location: String,
    pub recruiter_link: Option<String>,
    pub link: Option<String>,
    pub pdf_path: Option<String>,
}
