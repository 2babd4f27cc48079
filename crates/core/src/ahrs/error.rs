//! Estimator error types

/// Which queue a sample was expected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSource {
    Gyro,
    Accel,
}

impl SampleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleSource::Gyro => "gyro",
            SampleSource::Accel => "accel",
        }
    }
}

/// Estimator cycle failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorError {
    /// No sample arrived within the receive timeout
    Timeout(SampleSource),
}

impl EstimatorError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorError::Timeout(_) => "Timeout",
        }
    }
}

impl core::fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EstimatorError::Timeout(source) => {
                write!(f, "timed out waiting for {} sample", source.as_str())
            }
        }
    }
}
