use thiserror::Error;

use whfacts_upstream::UpstreamError;

/// Errors surfaced by a backfill run. Transient upstream trouble never
/// reaches this level — it is absorbed by the retry engine or escalated as
/// [`UpstreamError::RetriesExhausted`].
#[derive(Debug, Error)]
pub enum BackfillError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error("invalid calendar month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}
