//! Collaborator traits for platform-agnostic attitude estimation.
//!
//! The estimator talks to the outside world only through these narrow
//! interfaces. Each trait has a mock implementation that is always available
//! so host tests can drive the tasks deterministically.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Methods take `&self` where the collaborator is shared between tasks
//! - Platform implementations (Embassy time, hardware watchdog) live in the
//!   firmware crate or the application

pub mod alarm;
pub mod flight;
pub mod time;
pub mod watchdog;

pub use alarm::{AlarmChannel, AlarmSeverity, AlarmSink, MockAlarms};
pub use flight::{ArmedState, FlightStatus, MockFlightStatus};
pub use time::{MockTime, TimeSource};
pub use watchdog::{MockWatchdog, Watchdog, WatchdogFlag};
