//! Task timing metadata and statistics
//!
//! The task loops themselves run on Embassy in the firmware crate; this
//! module only describes them and measures how well they keep their period.

pub mod types;

pub use types::*;
