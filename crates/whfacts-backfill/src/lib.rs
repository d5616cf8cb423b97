//! The per-warehouse ingestion pipeline.
//!
//! For each warehouse, the whole range's sales series is fetched in one
//! call, then the remaining per-day metric groups are fetched concurrently
//! in bounded date chunks, merged into one [`DayPatch`] per day, and
//! committed in a single transaction per warehouse-range.
//!
//! [`DayPatch`]: whfacts_core::facts::DayPatch

mod chunks;
mod error;
mod pipeline;

pub use chunks::chunk_size;
pub use error::BackfillError;
pub use pipeline::{collect_warehouse_range, Backfill, BackfillOptions, BackfillSummary};
