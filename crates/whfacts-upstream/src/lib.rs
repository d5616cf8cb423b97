//! Client for the upstream commerce API.
//!
//! Every request flows through the same three gates: the global in-flight
//! [`Semaphore`](tokio::sync::Semaphore) ceiling, the process-wide
//! [`Pacer`], and the transient-status retry loop with server-hinted
//! backoff. Collection endpoints are consumed through a lazy paginated row
//! stream; report endpoints have typed wrappers that normalize minor-unit
//! money on the way out.

mod backoff;
mod client;
mod error;
mod pacer;
mod paging;
mod reports;

pub use backoff::RetryPolicy;
pub use client::{UpstreamClient, UpstreamConfig};
pub use error::UpstreamError;
pub use pacer::Pacer;
pub use paging::{PageMeta, PageStrategy, PagedEnvelope};
pub use reports::{ProfitDay, StoreRecord};
