//! Parameter management types
//!
//! Typed parameter store and the attitude parameter group. Change
//! notification and locking live in the firmware crate.

pub mod attitude;
pub mod error;
pub mod storage;

pub use attitude::AttitudeSettings;
pub use error::ParameterError;
pub use storage::{ParamFlags, ParamMetadata, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};
