//! Session data: the loaded record sets and their lifecycle.

pub mod dataset;
pub mod handle;

pub use dataset::*;
pub use handle::*;
