//! Synchronized state shared between tasks.
//!
//! `EmbassyState<T>` wraps a value in Embassy's critical-section blocking
//! mutex. Every access runs inside one critical section, so a whole struct is
//! read or written without tearing, from async tasks and interrupt handlers
//! alike. On host, tests link the `critical-section` std implementation.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Platform-agnostic synchronized state access.
///
/// # Example
///
/// ```ignore
/// fn increment<S: SharedState<u32>>(state: &S) -> u32 {
///     state.with_mut(|value| {
///         *value += 1;
///         *value
///     })
/// }
/// ```
pub trait SharedState<T> {
    /// Access state immutably.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Access state mutably.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

/// Critical-section protected state.
pub struct EmbassyState<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<T>>,
}

impl<T> EmbassyState<T> {
    /// Creates a new `EmbassyState` wrapping the given value.
    ///
    /// This is a const fn, allowing static initialization.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }
}

impl<T: Copy> EmbassyState<T> {
    /// Copy of the current value
    pub fn get(&self) -> T {
        self.with(|value| *value)
    }

    /// Replace the whole value
    pub fn set(&self, value: T) {
        self.with_mut(|current| *current = value);
    }
}

impl<T> SharedState<T> for EmbassyState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
