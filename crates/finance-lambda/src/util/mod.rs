//! Utility modules.

pub mod datetime;

pub use datetime::{format_timestamp, now_epoch_micros, utc_date};
