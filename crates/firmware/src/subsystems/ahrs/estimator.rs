//! Attitude estimator task
//!
//! Consumes one gyro and one accel sample per cycle and runs the
//! complementary filter on them. A missing sample skips the cycle with an
//! ERROR alarm; the published attitude keeps its previous value.
//!
//! # Timing
//!
//! `dt` is measured between successful cycles, so the integration follows
//! whatever rate samples actually arrive at. The first cycle has no
//! predecessor and uses [`NOMINAL_DT_S`].

use super::context::FilterContext;
use super::services::TaskServices;
use super::settings::{apply_to_context, SettingsStore};
use crate::core::scheduler::{report_task_stats, TaskMetadata, TaskStats};
use crate::core::traits::{AlarmChannel, AlarmSeverity, WatchdogFlag};
use revo_ahrs_core::ahrs::{
    AttitudeState, ComplementaryFilter, EstimatorError, SampleSource, UpdateOutcome,
};
use revo_ahrs_core::sensors::SensorSample;

/// Integration step for the first cycle (one sensor period)
pub const NOMINAL_DT_S: f32 = 0.002;

/// Bounded wait per queue before a cycle is abandoned
pub const RECEIVE_TIMEOUT_MS: u64 = 10;

/// Gyro and accel sample consumed together.
pub type SamplePair = (SensorSample, SensorSample);

/// Consumer side of the attitude pipeline.
pub struct AttitudeEstimator<'a> {
    context: &'a FilterContext,
    services: TaskServices<'a>,
    filter: ComplementaryFilter,
    last_update_us: Option<u64>,
    stats: TaskStats,
    misses_at_last_report: u32,
}

impl<'a> AttitudeEstimator<'a> {
    pub fn new(context: &'a FilterContext, services: TaskServices<'a>) -> Self {
        Self {
            context,
            services,
            filter: ComplementaryFilter::new(),
            last_update_us: None,
            stats: TaskStats::default(),
            misses_at_last_report: 0,
        }
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    /// Clear the ATTITUDE alarm and force one settings application so the
    /// board rotation is loaded before the first cycle.
    ///
    /// The filter restarts from identity and the next cycle integrates over
    /// [`NOMINAL_DT_S`].
    pub fn start(&mut self, store: &SettingsStore) -> u32 {
        self.filter.reset();
        self.last_update_us = None;
        self.services.alarms.clear_alarm(AlarmChannel::Attitude);
        apply_to_context(&store.settings(), self.context)
    }

    /// Run one estimator cycle on the outcome of the receive stage.
    ///
    /// The attitude watchdog flag is fed whether or not the cycle succeeds.
    pub fn step(
        &mut self,
        samples: Result<SamplePair, EstimatorError>,
    ) -> Result<AttitudeState, EstimatorError> {
        let result = match samples {
            Ok((gyro, accel)) => Ok(self.update(gyro, accel)),
            Err(error) => {
                crate::log_warn!("Attitude cycle skipped: {}", error.as_str());
                self.services
                    .alarms
                    .set_alarm(AlarmChannel::Attitude, AlarmSeverity::Error);
                Err(error)
            }
        };

        self.services.watchdog.feed(WatchdogFlag::Attitude);
        result
    }

    /// Non-blocking variant of the receive stage: a queue that is empty
    /// right now counts as a timeout.
    pub fn try_cycle(&mut self) -> Result<AttitudeState, EstimatorError> {
        let samples = self.try_receive();
        self.step(samples)
    }

    fn try_receive(&self) -> Result<SamplePair, EstimatorError> {
        let queues = self.context.queues();
        let gyro = queues
            .gyro
            .try_receive()
            .map_err(|_| EstimatorError::Timeout(SampleSource::Gyro))?;
        let accel = queues
            .accel
            .try_receive()
            .map_err(|_| EstimatorError::Timeout(SampleSource::Accel))?;
        Ok((gyro, accel))
    }

    fn update(&mut self, gyro: SensorSample, accel: SensorSample) -> AttitudeState {
        let now_us = self.services.time.now_us();
        let dt = match self.last_update_us {
            Some(last) => self.services.time.seconds_since(last),
            None => NOMINAL_DT_S,
        };
        let period_us = match self.last_update_us {
            Some(last) => now_us.saturating_sub(last) as u32,
            None => TaskMetadata::ATTITUDE.period_us(),
        };
        self.last_update_us = Some(now_us);

        let gains = self.context.gains();
        let step = self.filter.update(gyro.value, accel.value, &gains, dt);
        self.context.adjust_gyro_bias_xy(step.bias_increment);

        if step.outcome == UpdateOutcome::Degenerate {
            crate::log_warn!("Attitude quaternion degenerate, reset to identity");
            crate::log_debug!(
                "Degenerate input: |gyro|={} |accel|={} dt={}",
                gyro.value.norm(),
                accel.value.norm(),
                dt
            );
        }

        let state = AttitudeState::from_quaternion(step.quaternion, now_us);
        self.context.publish_attitude(state);
        self.services.alarms.clear_alarm(AlarmChannel::Attitude);

        let execution_us = self.services.time.now_us().saturating_sub(now_us) as u32;
        self.record_timing(execution_us, period_us);
        state
    }

    fn record_timing(&mut self, execution_us: u32, period_us: u32) {
        let metadata = TaskMetadata::ATTITUDE;
        self.stats.record(&metadata, execution_us, period_us);
        if self.stats.summary_due(&metadata) {
            report_task_stats(&metadata, &self.stats, self.misses_at_last_report);
            self.misses_at_last_report = self.stats.deadline_misses;
        }
    }

    /// Receive stage with a bounded wait on each queue, gyro first.
    #[cfg(feature = "embassy")]
    pub async fn receive(&self) -> Result<SamplePair, EstimatorError> {
        use embassy_time::{with_timeout, Duration};

        let timeout = Duration::from_millis(RECEIVE_TIMEOUT_MS);
        let queues = self.context.queues();
        let gyro = with_timeout(timeout, queues.gyro.receive())
            .await
            .map_err(|_| EstimatorError::Timeout(SampleSource::Gyro))?;
        let accel = with_timeout(timeout, queues.accel.receive())
            .await
            .map_err(|_| EstimatorError::Timeout(SampleSource::Accel))?;
        Ok((gyro, accel))
    }

    /// One full cycle: bounded receive, then [`step`](Self::step).
    #[cfg(feature = "embassy")]
    pub async fn cycle(&mut self) -> Result<AttitudeState, EstimatorError> {
        let samples = self.receive().await;
        self.step(samples)
    }
}

/// Attitude task body. Paced by sample arrival on the queues.
///
/// Wrap in an `#[embassy_executor::task]` in the application.
#[cfg(feature = "embassy")]
pub async fn run_attitude_task(mut estimator: AttitudeEstimator<'_>, store: &SettingsStore) -> ! {
    estimator.start(store);
    loop {
        let _ = estimator.cycle().await;
    }
}
