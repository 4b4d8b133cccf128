use std::future::Future;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::models::{NewSubmission, Submission};

/// Query surface over the append-only submission log.
///
/// Exactly two shapes are needed by the feed: a bounded page of rows older
/// than a cursor, and everything newer than a cursor. Both are scoped to one
/// user and ordered newest-first. Any backing store satisfying these two
/// queries can drive a feed view.
pub trait SubmissionStore {
    /// Up to `limit` submissions with `id < before`, descending by id.
    /// `before = None` means "from the newest row" (first page).
    fn page_before(
        &self,
        user_id: i64,
        limit: u32,
        before: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Submission>, StoreError>> + Send;

    /// All submissions with `id > since`, descending by id.
    /// `since = None` means "everything" (nothing loaded yet).
    fn newer_than(
        &self,
        user_id: i64,
        since: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Submission>, StoreError>> + Send;
}

/// SQLite-backed submission store.
///
/// The `success` table is appended to by the external job-submission
/// process; this crate only reads it, except for the seeder used by tests
/// and the demo CLI. A `users` table maps an authenticated email to the
/// `user_id` the log is scoped by.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database file, creating it if missing.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Ok(Self { pool })
    }

    /// Creates the `users` and `success` tables when absent.
    /// The external writer normally owns the schema; first runs and tests
    /// need it bootstrapped here.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS success (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                company TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                recruiter_link TEXT,
                link TEXT,
                pdf_path TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Resolves an authenticated email to its store user id.
    /// Absence is an expected empty state (account not provisioned yet),
    /// not an error.
    pub async fn user_id_for_email(&self, email: &str) -> Result<Option<i64>, StoreError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    /// Looks up the user id for an email, creating the row if needed.
    pub async fn provision_user(&self, email: &str) -> Result<i64, StoreError> {
        sqlx::query("INSERT OR IGNORE INTO users (email) VALUES (?)")
            .bind(email)
            .execute(&self.pool)
            .await?;

        self.user_id_for_email(email)
            .await?
            .ok_or_else(|| StoreError::UnknownUser(email.to_string()))
    }

    /// Appends one submission, returning its assigned id.
    pub async fn insert_submission(
        &self,
        user_id: i64,
        submission: &NewSubmission,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO success (user_id, company, title, location, recruiter_link, link, pdf_path)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&submission.company)
        .bind(&submission.title)
        .bind(&submission.location)
        .bind(&submission.recruiter_link)
        .bind(&submission.link)
        .bind(&submission.pdf_path)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

const SUBMISSION_COLUMNS: &str =
    "id, user_id, company, title, location, recruiter_link, link, pdf_path";

impl SubmissionStore for SqliteStore {
    async fn page_before(
        &self,
        user_id: i64,
        limit: u32,
        before: Option<i64>,
    ) -> Result<Vec<Submission>, StoreError> {
        let rows = match before {
            None => {
                sqlx::query_as::<_, Submission>(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM success \
                     WHERE user_id = ? ORDER BY id DESC LIMIT ?"
                ))
                .bind(user_id)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await?
            }
            Some(before) => {
                sqlx::query_as::<_, Submission>(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM success \
                     WHERE user_id = ? AND id < ? ORDER BY id DESC LIMIT ?"
                ))
                .bind(user_id)
                .bind(before)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    async fn newer_than(
        &self,
        user_id: i64,
        since: Option<i64>,
    ) -> Result<Vec<Submission>, StoreError> {
        let rows = match since {
            None => {
                sqlx::query_as::<_, Submission>(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM success \
                     WHERE user_id = ? ORDER BY id DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(since) => {
                sqlx::query_as::<_, Submission>(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM success \
                     WHERE user_id = ? AND id > ? ORDER BY id DESC"
                ))
                .bind(user_id)
                .bind(since)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }
}
