use thiserror::Error;

/// Failures surfaced by a submission store.
/// The feed itself never propagates these past its boundary; every store
/// outcome is folded into a state transition plus an observer event.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no user provisioned for {0}")]
    UnknownUser(String),

    #[error("{0}")]
    Backend(String),
}
