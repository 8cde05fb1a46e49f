//! Pure pipeline stages over loaded records.
//!
//! - record filters (`filter`)
//! - named periods to date ranges (`period`)
//! - daily/monthly trend buckets (`bucket`)
//! - latest-value reduction and summary tiles (`latest`)
//! - yearly epidemiological/GDP join (`join`)
//! - labor chart series (`labor`)
//!
//! None of these touch the filesystem or mutate their input.

pub mod bucket;
pub mod filter;
pub mod join;
pub mod labor;
pub mod latest;
pub mod period;

pub use bucket::*;
pub use filter::*;
pub use join::*;
pub use labor::*;
pub use latest::*;
pub use period::*;
