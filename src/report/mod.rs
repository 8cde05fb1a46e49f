//! Reporting utilities: formatted terminal output for every view.

pub mod format;

pub use format::*;
