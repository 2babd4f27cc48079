//! Sensor acquisition task
//!
//! Runs every 2 ms on an absolute schedule. Each cycle it:
//!
//! 1. Re-evaluates the gain schedule and writes the effective gains
//! 2. Drains and averages the accelerometer and gyroscope FIFOs. If either
//!    comes up empty nothing is published or queued this cycle
//! 3. Calibrates, publishes and queues the accel sample, then the gyro
//!    sample, queueing the uncorrected rates and publishing the
//!    bias-corrected ones
//! 4. Nudges the yaw bias toward a zero mean yaw rate
//! 5. Publishes a magnetometer reading when one is available
//!
//! A failed self-test at start halts the task for good. It keeps feeding
//! the watchdog so the supervisor sees the CRITICAL alarm rather than a hang.

use super::context::FilterContext;
use super::queues::push_sample;
use super::services::TaskServices;
use crate::core::scheduler::{report_task_stats, TaskMetadata, TaskStats};
use crate::core::traits::{AlarmChannel, AlarmSeverity, WatchdogFlag};
use nalgebra::Vector3;
use revo_ahrs_core::ahrs::{FilterConfig, FilterGains, GainSchedule, GainUpdate};
use revo_ahrs_core::sensors::{
    drain_fifo, remap_to_body, FifoSensor, Magnetometer, SensorError, SensorKind, SensorSample,
};

/// The three sensors sampled by the task.
pub struct SensorSet<A, G, M> {
    pub accel: A,
    pub gyro: G,
    pub mag: M,
}

/// Lifecycle of the acquisition task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Running,
    /// Self-test failed; only the watchdog is serviced from now on
    Halted(SensorError),
}

/// What one successful cycle produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorCycle {
    pub accel: SensorSample,
    /// Scaled gyro rates as queued to the estimator
    pub gyro: SensorSample,
    /// Gyro rates with the learned bias applied (when enabled)
    pub gyro_corrected: SensorSample,
    pub accel_reads: u32,
    pub gyro_reads: u32,
    /// At least one queue push was dropped
    pub queue_full: bool,
    pub mag: Option<Vector3<f32>>,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorTick {
    Halted,
    Failed(SensorError),
    Acquired(SensorCycle),
}

/// Producer side of the attitude pipeline.
pub struct SensorAcquisition<'a, A, G, M> {
    context: &'a FilterContext,
    sensors: SensorSet<A, G, M>,
    services: TaskServices<'a>,
    schedule: GainSchedule,
    state: AcquisitionState,
    stats: TaskStats,
    last_tick_us: Option<u64>,
    misses_at_last_report: u32,
}

impl<'a, A, G, M> SensorAcquisition<'a, A, G, M>
where
    A: FifoSensor,
    G: FifoSensor,
    M: Magnetometer,
{
    pub fn new(
        context: &'a FilterContext,
        sensors: SensorSet<A, G, M>,
        services: TaskServices<'a>,
    ) -> Self {
        Self {
            context,
            sensors,
            services,
            schedule: GainSchedule::new(),
            state: AcquisitionState::Running,
            stats: TaskStats::default(),
            last_tick_us: None,
            misses_at_last_report: 0,
        }
    }

    pub fn sensors_mut(&mut self) -> &mut SensorSet<A, G, M> {
        &mut self.sensors
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    /// Clear the SENSORS alarm and self-test every sensor.
    ///
    /// All three tests run even if an earlier one fails. On failure the
    /// task raises CRITICAL on SENSORS and halts.
    #[allow(unused_variables)]
    pub fn start(&mut self) -> Result<(), SensorError> {
        self.services.alarms.clear_alarm(AlarmChannel::Sensors);

        let results = [
            (SensorKind::Accelerometer, self.sensors.accel.self_test()),
            (SensorKind::Gyroscope, self.sensors.gyro.self_test()),
            (SensorKind::Magnetometer, self.sensors.mag.self_test()),
        ];

        let mut first_failure = None;
        for (kind, result) in results {
            match result {
                Ok(()) => crate::log_info!("Self-test {}: pass", kind.as_str()),
                Err(fault) => {
                    crate::log_error!("Self-test {}: {}", kind.as_str(), fault.as_str());
                    first_failure.get_or_insert(SensorError::SelfTest(kind, fault));
                }
            }
        }

        match first_failure {
            None => {
                self.state = AcquisitionState::Running;
                Ok(())
            }
            Some(error) => {
                self.services
                    .alarms
                    .set_alarm(AlarmChannel::Sensors, AlarmSeverity::Critical);
                crate::log_error!("Sensor task halted: {}", error.as_str());
                self.state = AcquisitionState::Halted(error);
                Err(error)
            }
        }
    }

    /// Run one acquisition cycle.
    ///
    /// The sensors watchdog flag is fed on every path.
    pub fn tick(&mut self) -> SensorTick {
        if let AcquisitionState::Halted(_) = self.state {
            self.services.watchdog.feed(WatchdogFlag::Sensors);
            return SensorTick::Halted;
        }

        let start_us = self.services.time.now_us();
        let config = self.context.config().config();
        self.apply_gain_schedule(start_us / 1000, &config);
        let gains = self.context.gains();

        let tick = match self.update_sensors(&config, &gains) {
            Ok(cycle) => {
                if !cycle.queue_full {
                    self.services.alarms.clear_alarm(AlarmChannel::Attitude);
                }
                SensorTick::Acquired(cycle)
            }
            Err(error) => {
                crate::log_warn!("Sensor read failed: {}", error.as_str());
                self.services
                    .alarms
                    .set_alarm(AlarmChannel::Attitude, AlarmSeverity::Error);
                SensorTick::Failed(error)
            }
        };

        self.services.watchdog.feed(WatchdogFlag::Sensors);
        self.record_timing(start_us);
        tick
    }

    #[allow(unused_variables)]
    fn apply_gain_schedule(&mut self, now_ms: u64, config: &FilterConfig) {
        let was_loaded = self.schedule.is_loaded();
        let armed = self.services.flight.armed_state();

        match self.schedule.evaluate(now_ms, armed, config) {
            GainUpdate::Converging(gains) => {
                if was_loaded {
                    crate::log_info!("Gain schedule: convergence gains at {}ms", now_ms);
                }
                self.context.set_gains(gains);
            }
            GainUpdate::Loaded(gains) => {
                crate::log_info!(
                    "Gain schedule: configured gains loaded at {}ms (kp={} ki={})",
                    now_ms,
                    gains.accel_kp,
                    gains.accel_ki
                );
                self.context.set_gains(gains);
            }
            GainUpdate::Unchanged => {}
        }
    }

    fn update_sensors(
        &mut self,
        config: &FilterConfig,
        gains: &FilterGains,
    ) -> Result<SensorCycle, SensorError> {
        let context = self.context;
        let queues = context.queues();
        let mut queue_full = false;

        // Both FIFOs must yield before either queue sees a sample
        let accel_avg = drain_fifo(&mut self.sensors.accel)?;
        let gyro_avg = drain_fifo(&mut self.sensors.gyro)?;

        let accel = SensorSample::new(
            (remap_to_body(accel_avg.mean) - config.accel_bias.as_vector())
                * self.sensors.accel.scale_factor(),
            self.sensors.accel.temperature(accel_avg.temperature),
        );
        context.publish_accels(accel);
        if push_sample(&queues.accel, accel).is_err() {
            crate::log_warn!("Accel queue full, sample dropped");
            self.services
                .alarms
                .set_alarm(AlarmChannel::Attitude, AlarmSeverity::Warning);
            queue_full = true;
        }

        let gyro = SensorSample::new(
            remap_to_body(gyro_avg.mean) * self.sensors.gyro.scale_factor(),
            self.sensors.gyro.temperature(gyro_avg.temperature),
        );
        context.publish_gyros_uncorrected(gyro);
        if push_sample(&queues.gyro, gyro).is_err() {
            crate::log_warn!("Gyro queue full, sample dropped");
            self.services
                .alarms
                .set_alarm(AlarmChannel::Attitude, AlarmSeverity::Warning);
            queue_full = true;
        }

        let mut gyro_corrected = gyro;
        if config.bias_correct_gyro {
            gyro_corrected.value += context.gyro_bias();
        }
        context.publish_gyros(gyro_corrected);

        // No yaw reference: weakly drive the mean yaw rate to zero
        context.adjust_gyro_bias_z(-gyro_corrected.value.z * gains.yaw_bias_rate);

        let mag = if self.sensors.mag.data_available() {
            let raw = self.sensors.mag.read_mag();
            let field = -Vector3::new(raw.x as f32, raw.y as f32, raw.z as f32);
            context.publish_magnetometer(field);
            Some(field)
        } else {
            None
        };

        Ok(SensorCycle {
            accel,
            gyro,
            gyro_corrected,
            accel_reads: accel_avg.count,
            gyro_reads: gyro_avg.count,
            queue_full,
            mag,
        })
    }

    fn record_timing(&mut self, start_us: u64) {
        let metadata = TaskMetadata::SENSORS;
        let end_us = self.services.time.now_us();
        let execution_us = end_us.saturating_sub(start_us) as u32;
        let period_us = match self.last_tick_us {
            Some(last) => start_us.saturating_sub(last) as u32,
            None => metadata.period_us(),
        };
        self.last_tick_us = Some(start_us);

        self.stats.record(&metadata, execution_us, period_us);
        if self.stats.summary_due(&metadata) {
            report_task_stats(&metadata, &self.stats, self.misses_at_last_report);
            self.misses_at_last_report = self.stats.deadline_misses;
        }
    }
}

/// Sensor task body: self-test, then tick every 2 ms forever.
///
/// Wrap in an `#[embassy_executor::task]` in the application.
#[cfg(feature = "embassy")]
pub async fn run_sensor_task<A, G, M>(mut acquisition: SensorAcquisition<'_, A, G, M>) -> !
where
    A: FifoSensor,
    G: FifoSensor,
    M: Magnetometer,
{
    use embassy_time::{Duration, Ticker, Timer};

    if acquisition.start().is_err() {
        loop {
            acquisition.tick();
            Timer::after_millis(1).await;
        }
    }

    let period = Duration::from_micros(TaskMetadata::SENSORS.period_us() as u64);
    let mut ticker = Ticker::every(period);
    loop {
        acquisition.tick();
        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockTime;
    use revo_ahrs_core::ahrs::CalibrationBias;
    use revo_ahrs_core::sensors::{
        MockFifoSensor, MockMagnetometer, RawSample, SensorFault, TemperatureModel,
    };
    use revo_ahrs_core::traits::{
        AlarmSink, ArmedState, MockAlarms, MockFlightStatus, MockWatchdog,
    };

    const EPSILON: f32 = 1.0e-4;

    /// Past the warm-up window, so configured gains apply
    const AFTER_WARMUP_US: u64 = 10_000_000;

    struct Rig {
        context: FilterContext,
        alarms: MockAlarms,
        watchdog: MockWatchdog,
        flight: MockFlightStatus,
        time: MockTime,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                context: FilterContext::new(),
                alarms: MockAlarms::new(),
                watchdog: MockWatchdog::new(),
                flight: MockFlightStatus::new(ArmedState::Disarmed),
                time: MockTime::with_initial(AFTER_WARMUP_US),
            }
        }

        fn services(&self) -> TaskServices<'_> {
            TaskServices::new(&self.alarms, &self.watchdog, &self.flight, &self.time)
        }

        fn acquisition(
            &self,
        ) -> SensorAcquisition<'_, MockFifoSensor, MockFifoSensor, MockMagnetometer> {
            let sensors = SensorSet {
                accel: MockFifoSensor::accelerometer(0.01),
                gyro: MockFifoSensor::gyroscope(0.1),
                mag: MockMagnetometer::new(),
            };
            SensorAcquisition::new(&self.context, sensors, self.services())
        }

        fn set_config(&self, config: FilterConfig) {
            self.context.config().store(config);
        }
    }

    fn acquired(tick: SensorTick) -> SensorCycle {
        match tick {
            SensorTick::Acquired(cycle) => cycle,
            other => panic!("expected a sample, got {:?}", other),
        }
    }

    #[test]
    fn average_is_remapped_and_scaled_independent_of_count() {
        let rig = Rig::new();
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        // Mean (10, 20, 30) from one reading, then from four readings
        let sensors = acquisition.sensors_mut();
        sensors.accel.push_burst(&[RawSample::new(10, 20, 30)]);
        sensors.gyro.push_burst(&[
            RawSample::new(0, 10, 20),
            RawSample::new(20, 30, 40),
            RawSample::new(10, 20, 30),
            RawSample::new(10, 20, 30),
        ]);

        let cycle = acquired(acquisition.tick());
        assert_eq!(cycle.accel_reads, 1);
        assert_eq!(cycle.gyro_reads, 4);
        assert!((cycle.accel.value - Vector3::new(0.2, 0.1, -0.3)).norm() < EPSILON);
        assert!((cycle.gyro.value - Vector3::new(2.0, 1.0, -3.0)).norm() < EPSILON);
    }

    #[test]
    fn accel_bias_is_subtracted_in_counts() {
        let rig = Rig::new();
        rig.set_config(FilterConfig {
            accel_bias: CalibrationBias::new(5, -5, 10),
            ..FilterConfig::default()
        });
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        let sensors = acquisition.sensors_mut();
        // Body frame before bias: (y, x, -z) = (100, 100, -100)
        sensors.accel.push_burst(&[RawSample::new(100, 100, 100)]);
        sensors.gyro.push_burst(&[RawSample::new(0, 0, 0)]);

        let cycle = acquired(acquisition.tick());
        assert!((cycle.accel.value - Vector3::new(0.95, 1.05, -1.1)).norm() < EPSILON);
        assert_eq!(rig.context.accels(), cycle.accel);
    }

    #[test]
    fn temperatures_use_driver_models() {
        let rig = Rig::new();
        let sensors = SensorSet {
            accel: MockFifoSensor::accelerometer(1.0)
                .with_temperature_model(TemperatureModel::BMA180),
            gyro: MockFifoSensor::gyroscope(1.0).with_temperature_model(TemperatureModel::MPU6000),
            mag: MockMagnetometer::new(),
        };
        let mut acquisition = SensorAcquisition::new(&rig.context, sensors, rig.services());
        acquisition.start().unwrap();

        let sensors = acquisition.sensors_mut();
        sensors
            .accel
            .push_burst(&[RawSample::new(0, 0, 0).with_temperature(12)]);
        sensors
            .gyro
            .push_burst(&[RawSample::new(0, 0, 0).with_temperature(-512)]);

        let cycle = acquired(acquisition.tick());
        assert!((cycle.accel.temperature - 30.0).abs() < EPSILON);
        assert!((cycle.gyro.temperature - 35.0).abs() < EPSILON);
    }

    #[test]
    fn queue_overflow_warns_and_keeps_oldest() {
        let rig = Rig::new();
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        for i in 0..11i16 {
            let sensors = acquisition.sensors_mut();
            sensors.accel.push_burst(&[RawSample::new(0, i, 0)]);
            sensors.gyro.push_burst(&[RawSample::new(0, i, 0)]);
            let cycle = acquired(acquisition.tick());
            assert_eq!(cycle.queue_full, i == 10);
        }

        assert_eq!(
            rig.alarms.level(AlarmChannel::Attitude),
            Some(AlarmSeverity::Warning)
        );
        assert_eq!(
            rig.alarms
                .raised_count(AlarmChannel::Attitude, AlarmSeverity::Warning),
            2
        );

        let queue = &rig.context.queues().accel;
        for i in 0..10 {
            let sample = queue.try_receive().unwrap();
            assert!((sample.value.x - i as f32 * 0.01).abs() < EPSILON);
        }
        assert!(queue.try_receive().is_err());
    }

    #[test]
    fn gyro_queue_gets_uncorrected_rates() {
        let rig = Rig::new();
        rig.context.set_gyro_bias(Vector3::new(1.0, -1.0, 0.0));
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        let sensors = acquisition.sensors_mut();
        sensors.accel.push_burst(&[RawSample::new(0, 0, 0)]);
        sensors.gyro.push_burst(&[RawSample::new(0, 50, 0)]);

        let cycle = acquired(acquisition.tick());
        assert!((cycle.gyro.value - Vector3::new(5.0, 0.0, 0.0)).norm() < EPSILON);
        assert!((cycle.gyro_corrected.value - Vector3::new(6.0, -1.0, 0.0)).norm() < EPSILON);

        let queued = rig.context.queues().gyro.try_receive().unwrap();
        assert_eq!(queued, cycle.gyro);
        assert_eq!(rig.context.gyros(), cycle.gyro_corrected);
        assert_eq!(rig.context.gyros_uncorrected(), cycle.gyro);
    }

    #[test]
    fn yaw_bias_converges_geometrically() {
        let rig = Rig::new();
        let gains = FilterGains {
            yaw_bias_rate: 0.01,
            ..FilterGains::default()
        };
        rig.set_config(FilterConfig {
            gains,
            ..FilterConfig::default()
        });
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        // Constant 2 deg/s yaw offset: raw z = -20 counts remaps to +2.0
        let offset = RawSample::new(0, 0, -20);
        let sensors = acquisition.sensors_mut();
        sensors.accel.set_repeating(Some(RawSample::new(0, 0, 100)));
        sensors.gyro.set_repeating(Some(offset));

        let mut previous_error = 2.0f32;
        for _ in 0..500 {
            let cycle = acquired(acquisition.tick());
            let error = cycle.gyro_corrected.value.z.abs();
            assert!(error <= previous_error + EPSILON);
            previous_error = error;
            // Keep the queues drained
            let _ = rig.context.queues().gyro.try_receive();
            let _ = rig.context.queues().accel.try_receive();
        }

        // (1 - 0.01)^500 is below 1%
        assert!((rig.context.gyro_bias().z + 2.0).abs() < 0.02);
    }

    #[test]
    fn self_test_failure_halts_with_critical_and_keeps_feeding() {
        let rig = Rig::new();
        let mut acquisition = rig.acquisition();
        acquisition
            .sensors_mut()
            .accel
            .fail_self_test(SensorFault::OutOfRange);

        assert_eq!(
            acquisition.start(),
            Err(SensorError::SelfTest(
                SensorKind::Accelerometer,
                SensorFault::OutOfRange
            ))
        );
        assert_eq!(
            rig.alarms.level(AlarmChannel::Sensors),
            Some(AlarmSeverity::Critical)
        );

        acquisition
            .sensors_mut()
            .accel
            .set_repeating(Some(RawSample::new(1, 1, 1)));
        acquisition
            .sensors_mut()
            .gyro
            .set_repeating(Some(RawSample::new(1, 1, 1)));

        for _ in 0..20 {
            assert_eq!(acquisition.tick(), SensorTick::Halted);
        }
        assert_eq!(rig.watchdog.feeds(WatchdogFlag::Sensors), 20);
        assert_eq!(acquisition.sensors_mut().accel.reads(), 0);
        assert!(rig.context.queues().accel.try_receive().is_err());
        assert!(rig.context.queues().gyro.try_receive().is_err());
    }

    #[test]
    fn read_failure_raises_error_for_one_cycle() {
        let rig = Rig::new();
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        // Accel never produces data
        assert_eq!(
            acquisition.tick(),
            SensorTick::Failed(SensorError::NoData(SensorKind::Accelerometer))
        );
        assert_eq!(
            rig.alarms.level(AlarmChannel::Attitude),
            Some(AlarmSeverity::Error)
        );
        assert_eq!(rig.watchdog.feeds(WatchdogFlag::Sensors), 1);

        let sensors = acquisition.sensors_mut();
        sensors.accel.push_burst(&[RawSample::new(0, 0, 100)]);
        sensors.gyro.push_burst(&[RawSample::new(0, 0, 0)]);
        acquired(acquisition.tick());

        assert_eq!(rig.alarms.level(AlarmChannel::Attitude), None);
        assert_eq!(rig.watchdog.feeds(WatchdogFlag::Sensors), 2);
        assert_eq!(acquisition.state(), AcquisitionState::Running);
    }

    #[test]
    fn stalled_gyro_leaves_queues_in_step() {
        let rig = Rig::new();
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        // Accel keeps delivering while the gyro FIFO stays empty
        let sensors = acquisition.sensors_mut();
        sensors.accel.set_repeating(Some(RawSample::new(0, 0, 100)));
        assert_eq!(
            acquisition.tick(),
            SensorTick::Failed(SensorError::NoData(SensorKind::Gyroscope))
        );
        let queues = rig.context.queues();
        assert_eq!(queues.accel.len(), 0);
        assert_eq!(queues.gyro.len(), 0);
        assert_eq!(rig.context.accels(), SensorSample::ZERO);

        acquisition
            .sensors_mut()
            .gyro
            .set_repeating(Some(RawSample::new(0, 0, 0)));
        for _ in 0..3 {
            acquired(acquisition.tick());
        }
        assert_eq!(queues.accel.len(), 3);
        assert_eq!(queues.gyro.len(), 3);
    }

    #[test]
    fn magnetometer_is_sign_inverted_when_available() {
        let rig = Rig::new();
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        let sensors = acquisition.sensors_mut();
        sensors.accel.set_repeating(Some(RawSample::new(0, 0, 100)));
        sensors.gyro.set_repeating(Some(RawSample::new(0, 0, 0)));
        sensors.mag.set_pending(RawSample::new(100, -200, 300));

        let cycle = acquired(acquisition.tick());
        assert_eq!(cycle.mag, Some(Vector3::new(-100.0, 200.0, -300.0)));
        assert_eq!(rig.context.magnetometer(), Vector3::new(-100.0, 200.0, -300.0));

        let cycle = acquired(acquisition.tick());
        assert_eq!(cycle.mag, None);
        assert_eq!(rig.context.magnetometer(), Vector3::new(-100.0, 200.0, -300.0));
    }

    #[test]
    fn gain_schedule_drives_context_gains() {
        let rig = Rig::new();
        rig.time.set(2_000_000);
        let mut acquisition = rig.acquisition();
        acquisition.start().unwrap();

        let sensors = acquisition.sensors_mut();
        sensors.accel.set_repeating(Some(RawSample::new(0, 0, 100)));
        sensors.gyro.set_repeating(Some(RawSample::new(0, 0, 0)));

        acquired(acquisition.tick());
        assert_eq!(rig.context.gains(), FilterGains::default().converging());

        rig.time.set(8_000_000);
        acquired(acquisition.tick());
        assert_eq!(rig.context.gains(), FilterGains::default());

        // Arming with zero-during-arming re-enters convergence
        rig.flight.set(ArmedState::Arming);
        rig.time.set(9_000_000);
        acquired(acquisition.tick());
        assert_eq!(rig.context.gains(), FilterGains::default().converging());
    }

    #[test]
    fn start_clears_sensor_alarm() {
        let rig = Rig::new();
        rig.alarms
            .set_alarm(AlarmChannel::Sensors, AlarmSeverity::Warning);
        let mut acquisition = rig.acquisition();

        assert_eq!(acquisition.start(), Ok(()));
        assert_eq!(rig.alarms.level(AlarmChannel::Sensors), None);
    }
}
