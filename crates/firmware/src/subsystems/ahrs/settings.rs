//! Settings store and reactor
//!
//! `SettingsStore` owns the attitude parameters and raises a change signal on
//! every successful write. `SettingsReactor` waits for that signal and
//! recomputes the shared configuration: the config snapshot, the effective
//! gains and the gyro bias, all from one read of the parameters.

use super::context::FilterContext;
use crate::core::traits::{EmbassyState, SharedState};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use revo_ahrs_core::ahrs::apply_settings;
use revo_ahrs_core::parameters::{AttitudeSettings, ParamValue, ParameterError, ParameterStore};

/// Parameter store with change notification.
pub struct SettingsStore {
    params: EmbassyState<ParameterStore>,
    changed: Signal<CriticalSectionRawMutex, u32>,
}

impl SettingsStore {
    /// Empty store; call [`register_defaults`](Self::register_defaults) before use.
    pub const fn new() -> Self {
        Self {
            params: EmbassyState::new(ParameterStore::new()),
            changed: Signal::new(),
        }
    }

    /// Store with all attitude parameters registered at their defaults.
    pub fn with_defaults() -> Result<Self, ParameterError> {
        let store = Self::new();
        store.register_defaults()?;
        Ok(store)
    }

    pub fn register_defaults(&self) -> Result<(), ParameterError> {
        self.params
            .with_mut(|params| AttitudeSettings::register_defaults(params))
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.params.with(|params| params.get(name).copied())
    }

    /// Write one parameter and notify the reactor.
    pub fn set(&self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let generation = self.params.with_mut(|params| -> Result<u32, ParameterError> {
            params.set(name, value)?;
            Ok(params.generation())
        })?;
        self.changed.signal(generation);
        Ok(())
    }

    /// Typed view of the current parameters
    pub fn settings(&self) -> AttitudeSettings {
        self.params.with(AttitudeSettings::from_store)
    }

    /// Consume a pending change notification, if any.
    pub fn take_change(&self) -> Option<u32> {
        self.changed.try_take()
    }

    /// Wait for the next change notification.
    pub async fn wait_change(&self) -> u32 {
        self.changed.wait().await
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Recompute the shared configuration from `settings`.
///
/// Returns the new configuration generation.
#[allow(unused_variables)]
pub fn apply_to_context(settings: &AttitudeSettings, context: &FilterContext) -> u32 {
    let update = apply_settings(settings);

    let generation = context.config().store(update.config);
    context.set_gains(update.config.gains);
    context.set_gyro_bias(update.gyro_bias);

    let gains = update.config.gains;
    crate::log_info!(
        "Attitude settings applied (gen {}): kp={} ki={} yaw_rate={} rotate={}",
        generation,
        gains.accel_kp,
        gains.accel_ki,
        gains.yaw_bias_rate,
        update.config.board_rotation.active
    );

    generation
}

/// Reacts to settings changes by rewriting the filter configuration.
pub struct SettingsReactor<'a> {
    store: &'a SettingsStore,
    context: &'a FilterContext,
}

impl<'a> SettingsReactor<'a> {
    pub fn new(store: &'a SettingsStore, context: &'a FilterContext) -> Self {
        Self { store, context }
    }

    /// Apply the current settings unconditionally.
    pub fn apply(&self) -> u32 {
        apply_to_context(&self.store.settings(), self.context)
    }

    /// Apply if a change is pending; returns the new config generation.
    pub fn poll(&self) -> Option<u32> {
        self.store.take_change().map(|_| self.apply())
    }

    /// Reactor loop: one application per change notification.
    pub async fn run(&self) -> ! {
        loop {
            self.store.wait_change().await;
            self.apply();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_futures::select::{select, Either};
    use embassy_futures::yield_now;
    use nalgebra::Vector3;
    use revo_ahrs_core::ahrs::{BoardRotation, FilterGains};

    const EPSILON: f32 = 1.0e-6;

    #[test]
    fn set_notifies_and_get_reads_back() {
        let store = SettingsStore::with_defaults().unwrap();
        assert_eq!(store.take_change(), None);

        store.set("ATT_ACC_KP", ParamValue::Float(0.2)).unwrap();
        assert_eq!(store.get("ATT_ACC_KP"), Some(ParamValue::Float(0.2)));
        assert_eq!(store.take_change(), Some(1));
        assert_eq!(store.take_change(), None);
    }

    #[test]
    fn failed_set_does_not_notify() {
        let store = SettingsStore::with_defaults().unwrap();
        assert_eq!(
            store.set("ATT_ACC_KP", ParamValue::Bool(true)),
            Err(ParameterError::TypeMismatch)
        );
        assert_eq!(store.set("NOPE", ParamValue::Int(1)), Err(ParameterError::InvalidConfig));
        assert_eq!(store.take_change(), None);
    }

    #[test]
    fn reactor_applies_on_change_only() {
        let store = SettingsStore::with_defaults().unwrap();
        let context = FilterContext::new();
        let reactor = SettingsReactor::new(&store, &context);

        assert_eq!(reactor.poll(), None);
        assert_eq!(context.config().generation(), 0);

        store.set("ATT_ACC_KI", ParamValue::Float(0.01)).unwrap();
        assert_eq!(reactor.poll(), Some(1));
        assert!((context.config().config().gains.accel_ki - 0.01).abs() < EPSILON);
        assert!((context.gains().accel_ki - 0.01).abs() < EPSILON);
    }

    #[test]
    fn apply_overwrites_bias_and_gains() {
        let store = SettingsStore::with_defaults().unwrap();
        let context = FilterContext::new();
        context.set_gyro_bias(Vector3::new(9.0, 9.0, 9.0));
        context.set_gains(FilterGains::default().converging());

        store.set("ATT_GYR_BIAS_X", ParamValue::Int(250)).unwrap();
        store.set("ATT_GYR_BIAS_Z", ParamValue::Int(-50)).unwrap();
        SettingsReactor::new(&store, &context).apply();

        assert!((context.gyro_bias() - Vector3::new(2.5, 0.0, -0.5)).norm() < EPSILON);
        assert_eq!(context.gains(), FilterGains::default());
    }

    #[test]
    fn board_rotation_recomputed_on_apply() {
        let store = SettingsStore::with_defaults().unwrap();
        let context = FilterContext::new();
        let reactor = SettingsReactor::new(&store, &context);

        reactor.apply();
        assert!(!context.config().config().board_rotation.active);

        store.set("ATT_BOARD_PITCH", ParamValue::Float(10.0)).unwrap();
        reactor.apply();
        let rotation = context.config().config().board_rotation;
        assert!(rotation.active);
        assert_eq!(rotation, BoardRotation::from_degrees(0.0, 10.0, 0.0));
    }

    #[test]
    fn wait_change_pends_until_set() {
        let store = SettingsStore::with_defaults().unwrap();

        let idle = block_on(select(store.wait_change(), core::future::ready(())));
        assert!(matches!(idle, Either::Second(())));

        let (generation, ()) = block_on(join(store.wait_change(), async {
            store.set("ATT_ACC_KI", ParamValue::Float(0.01)).unwrap();
        }));
        assert_eq!(generation, 1);
        assert_eq!(store.take_change(), None);
    }

    #[test]
    fn reactor_loop_applies_each_change() {
        let store = SettingsStore::with_defaults().unwrap();
        let context = FilterContext::new();
        let reactor = SettingsReactor::new(&store, &context);

        let writer = async {
            store.set("ATT_ACC_KI", ParamValue::Float(0.01)).unwrap();
            while context.config().generation() < 1 {
                yield_now().await;
            }
            assert!((context.gains().accel_ki - 0.01).abs() < EPSILON);

            store.set("ATT_GYR_BIAS_Y", ParamValue::Int(-300)).unwrap();
            while context.config().generation() < 2 {
                yield_now().await;
            }
        };

        match block_on(select(reactor.run(), writer)) {
            Either::First(_) => unreachable!("reactor loop returned"),
            Either::Second(()) => {}
        }
        assert_eq!(context.config().generation(), 2);
        assert!((context.gyro_bias() - Vector3::new(0.0, -3.0, 0.0)).norm() < EPSILON);
    }
}
