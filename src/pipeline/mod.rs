//! The load-history data-shaping core.
//!
//! - hourly aggregation of raw load events into two comparable counters (`aggregate`)
//! - narrowing to one table / one kind (`filter`)
//! - source-vs-ingested mismatch detection (`discrepancy`)
//!
//! Everything in here is pure: slices in, fresh `Vec`s out, no I/O and no logging.

pub mod aggregate;
pub mod discrepancy;
pub mod error;
pub mod filter;

pub use aggregate::*;
pub use discrepancy::*;
pub use error::{PipelineError, Result};
pub use filter::*;
