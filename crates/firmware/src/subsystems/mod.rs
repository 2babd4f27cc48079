//! Flight-controller subsystems
//!
//! - AHRS: sensor acquisition, complementary filter and settings handling

pub mod ahrs;
