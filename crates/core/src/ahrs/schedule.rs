//! Start-up gain schedule
//!
//! Shortly after boot, and again while arming when configured to, the
//! filter runs with aggressive convergence gains so the accelerometer pulls
//! the initial bias estimate in quickly. Outside those windows the configured
//! gains are loaded once and then left alone until the window is re-entered.

use super::config::{FilterConfig, FilterGains};
use crate::traits::ArmedState;

/// Start of the boot convergence window (ms since boot, exclusive)
pub const WARMUP_START_MS: u64 = 1000;

/// End of the boot convergence window (ms since boot, exclusive)
pub const WARMUP_END_MS: u64 = 7000;

/// What the schedule decided for this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainUpdate {
    /// Inside a convergence window; these gains apply this cycle
    Converging(FilterGains),
    /// Window left (or first cycle); configured gains loaded once
    Loaded(FilterGains),
    /// Keep whatever gains are currently in effect
    Unchanged,
}

/// Gain schedule state, owned by the acquisition task.
#[derive(Debug, Clone, Copy, Default)]
pub struct GainSchedule {
    loaded: bool,
}

impl GainSchedule {
    pub const fn new() -> Self {
        Self { loaded: false }
    }

    /// True once configured gains have been loaded outside a window.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True if `now_ms` lies strictly inside the boot convergence window.
    pub fn in_warmup(now_ms: u64) -> bool {
        now_ms > WARMUP_START_MS && now_ms < WARMUP_END_MS
    }

    /// Evaluate the schedule for one acquisition cycle.
    pub fn evaluate(&mut self, now_ms: u64, armed: ArmedState, config: &FilterConfig) -> GainUpdate {
        let arming_reset = armed == ArmedState::Arming && config.zero_during_arming;

        if Self::in_warmup(now_ms) || arming_reset {
            self.loaded = false;
            GainUpdate::Converging(config.gains.converging())
        } else if !self.loaded {
            self.loaded = true;
            GainUpdate::Loaded(config.gains)
        } else {
            GainUpdate::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FilterConfig {
        FilterConfig::default()
    }

    #[test]
    fn loads_configured_gains_before_window() {
        let mut schedule = GainSchedule::new();
        let cfg = config();

        assert_eq!(
            schedule.evaluate(0, ArmedState::Disarmed, &cfg),
            GainUpdate::Loaded(cfg.gains)
        );
        assert_eq!(
            schedule.evaluate(500, ArmedState::Disarmed, &cfg),
            GainUpdate::Unchanged
        );
        assert!(schedule.is_loaded());
    }

    #[test]
    fn window_bounds_are_exclusive() {
        assert!(!GainSchedule::in_warmup(1000));
        assert!(GainSchedule::in_warmup(1001));
        assert!(GainSchedule::in_warmup(6999));
        assert!(!GainSchedule::in_warmup(7000));
    }

    #[test]
    fn converges_every_cycle_in_window_then_reloads_once() {
        let mut schedule = GainSchedule::new();
        let cfg = config();

        for t in [1500, 3000, 6999] {
            match schedule.evaluate(t, ArmedState::Disarmed, &cfg) {
                GainUpdate::Converging(g) => {
                    assert_eq!(g.accel_kp, FilterGains::CONVERGENCE_KP);
                    assert_eq!(g.accel_ki, FilterGains::CONVERGENCE_KI);
                    assert_eq!(g.yaw_bias_rate, FilterGains::CONVERGENCE_YAW_BIAS_RATE);
                }
                other => panic!("expected Converging at {} ms, got {:?}", t, other),
            }
        }

        assert_eq!(
            schedule.evaluate(7000, ArmedState::Disarmed, &cfg),
            GainUpdate::Loaded(cfg.gains)
        );
        assert_eq!(
            schedule.evaluate(7002, ArmedState::Armed, &cfg),
            GainUpdate::Unchanged
        );
    }

    #[test]
    fn arming_reenters_convergence_when_enabled() {
        let mut schedule = GainSchedule::new();
        let cfg = config();
        schedule.evaluate(10_000, ArmedState::Disarmed, &cfg);

        assert!(matches!(
            schedule.evaluate(20_000, ArmedState::Arming, &cfg),
            GainUpdate::Converging(_)
        ));
        assert!(!schedule.is_loaded());
        assert_eq!(
            schedule.evaluate(20_002, ArmedState::Armed, &cfg),
            GainUpdate::Loaded(cfg.gains)
        );
    }

    #[test]
    fn arming_ignored_when_disabled() {
        let mut schedule = GainSchedule::new();
        let cfg = FilterConfig {
            zero_during_arming: false,
            ..config()
        };
        schedule.evaluate(10_000, ArmedState::Disarmed, &cfg);

        assert_eq!(
            schedule.evaluate(20_000, ArmedState::Arming, &cfg),
            GainUpdate::Unchanged
        );
    }
}
