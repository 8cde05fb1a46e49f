//! Input/output helpers.
//!
//! - CSV ingest of the four source files (`ingest`)
//! - geography features for the map join (`geo`)
//! - chart series exports to CSV (`export`)

pub mod export;
pub mod geo;
pub mod ingest;

pub use export::*;
pub use geo::*;
pub use ingest::*;
