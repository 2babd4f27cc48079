#![cfg_attr(not(test), no_std)]

//! revo_ahrs_firmware - Embassy tasks for the attitude estimator
//!
//! This crate wraps the pure logic of `revo_ahrs_core` in the shared state,
//! bounded queues and task loops that run on target.
//!
//! # Design Principles
//!
//! - **Synchronous steps**: every task cycle is a plain method, host-testable
//! - **Embassy loops**: `embassy` feature adds the `Ticker`/`with_timeout` loops
//! - **Explicit context**: all shared state lives in one `FilterContext`
//!   passed to each task

// Firmware infrastructure: logging, shared state, task timing
pub mod core;

// Attitude estimation tasks
pub mod subsystems;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!)
// are exported at crate root via #[macro_export] in core::logging
