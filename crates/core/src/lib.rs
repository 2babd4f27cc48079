//! revo_ahrs_core - Pure no_std attitude estimation logic
//!
//! This crate contains the platform-agnostic half of the attitude estimator:
//! everything that can be tested on host without any feature flags or
//! embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Sensors, alarms, watchdog and time injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Collaborator traits (TimeSource, AlarmSink, Watchdog, FlightStatus)
//! - [`sensors`]: Sensor driver traits, FIFO averaging and sample types
//! - [`ahrs`]: Complementary filter, gain schedule and configuration state
//! - [`parameters`]: Parameter store and the attitude parameter group
//! - [`scheduler`]: Task metadata and timing statistics

#![no_std]

pub mod ahrs;
pub mod parameters;
pub mod scheduler;
pub mod sensors;
pub mod traits;
