//! Dedup ledger backends for Kizashi.
//!
//! Every backend implements [`DedupStore`](kizashi_interface::DedupStore):
//! an append-only record of confirmed publishes queried over a rolling
//! window.
//!
//! - [`InMemoryDedupStore`]: process-local, for tests and one-shot runs
//! - [`JsonDedupStore`]: a JSON ledger file, rewritten atomically on append
//! - `PostgresDedupStore` (feature `database`): a `publish_records` table

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod json;
mod memory;

#[cfg(feature = "database")]
mod postgres;
#[cfg(feature = "database")]
mod schema;

pub use json::JsonDedupStore;
pub use memory::InMemoryDedupStore;

#[cfg(feature = "database")]
pub use postgres::PostgresDedupStore;
