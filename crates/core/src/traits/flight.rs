//! Vehicle arming status as seen by the attitude subsystem.

use core::cell::Cell;

/// Arming state published by the flight status object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmedState {
    /// Motors off
    #[default]
    Disarmed,
    /// Arming sequence in progress
    Arming,
    /// Motors live
    Armed,
}

/// Read access to the current arming state.
pub trait FlightStatus {
    fn armed_state(&self) -> ArmedState;
}

impl<F: FlightStatus + ?Sized> FlightStatus for &F {
    fn armed_state(&self) -> ArmedState {
        (**self).armed_state()
    }
}

/// Settable flight status for host tests.
#[derive(Debug, Default)]
pub struct MockFlightStatus {
    state: Cell<ArmedState>,
}

impl MockFlightStatus {
    pub fn new(state: ArmedState) -> Self {
        Self {
            state: Cell::new(state),
        }
    }

    pub fn set(&self, state: ArmedState) {
        self.state.set(state);
    }
}

impl FlightStatus for MockFlightStatus {
    fn armed_state(&self) -> ArmedState {
        self.state.get()
    }
}
