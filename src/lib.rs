//! `covid-dash` library crate.
//!
//! The binary (`cdash`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - other front-ends can reuse the loaded dataset and the pure stages

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
