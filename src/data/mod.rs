//! Built-in data sources: the load-history query text and a synthetic sample
//! for demo mode.

pub mod query;
pub mod sample;

pub use query::LOAD_HISTORY_SQL;
pub use sample::generate_sample;
