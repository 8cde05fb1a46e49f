//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - parsed source records (`Observation`, `LaborObservation`, `GdpRecord`)
//! - the per-metric missing-value policy (`Metric`, `MissingPolicy`)
//! - pipeline outputs (`AggregatedBucket`, `Summary`, `YearlyRow`, `MapPoint`, ...)

pub mod types;

pub use types::*;
