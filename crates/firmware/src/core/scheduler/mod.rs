//! Task timing for the attitude tasks
//!
//! The tasks run on Embassy with absolute-deadline tickers:
//!
//! ```rust,ignore
//! let mut ticker = Ticker::every(Duration::from_micros(2000)); // 500Hz
//! loop {
//!     ticker.next().await;
//!     // Drain sensor FIFOs
//! }
//! ```
//!
//! Metadata and statistics types come from the core crate; this module adds
//! the periodic report.

pub mod monitor;

pub use monitor::{report_task_stats, TaskHealth};
pub use revo_ahrs_core::scheduler::{TaskMetadata, TaskStats};
