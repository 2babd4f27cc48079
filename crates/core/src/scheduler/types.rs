//! Task timing types
//!
//! - Task metadata (compile-time configuration)
//! - Task statistics (runtime monitoring)

/// Task metadata registered at compile-time
///
/// Each task in the scheduler has associated metadata that defines its
/// execution characteristics and resource requirements.
#[derive(Debug, Clone, Copy)]
pub struct TaskMetadata {
    /// Human-readable task name for logging and debugging
    pub name: &'static str,

    /// Target execution rate in Hz
    pub rate_hz: u32,

    /// Priority hint (0-255, higher = more important). Both attitude tasks
    /// share one priority; the executor does not enforce it.
    pub priority: u8,

    /// Execution time budget in microseconds
    ///
    /// If a task execution exceeds this budget, a deadline miss warning is logged.
    /// This should be set to less than the task period to allow overhead.
    ///
    /// Example: the 500 Hz sensor task (2000us period) gets 1500us.
    pub budget_us: u32,
}

impl TaskMetadata {
    /// Sensor acquisition: fixed 2 ms schedule
    pub const SENSORS: TaskMetadata = TaskMetadata {
        name: "sensors",
        rate_hz: 500,
        priority: 3,
        budget_us: 1500,
    };

    /// Attitude estimator: data-driven, nominally paced by the sensor task
    pub const ATTITUDE: TaskMetadata = TaskMetadata {
        name: "attitude",
        rate_hz: 500,
        priority: 3,
        budget_us: 1500,
    };

    /// Calculate the task period in microseconds from the rate
    #[inline]
    pub const fn period_us(&self) -> u32 {
        1_000_000 / self.rate_hz
    }

    /// Check if execution time is within budget
    #[inline]
    pub const fn is_within_budget(&self, execution_us: u32) -> bool {
        execution_us <= self.budget_us
    }

    /// Check if period deviation exceeds tolerance (5%)
    #[inline]
    pub fn is_period_acceptable(&self, actual_period_us: u32) -> bool {
        let target = self.period_us();
        let tolerance = target / 20; // 5% tolerance
        let lower = target.saturating_sub(tolerance);
        let upper = target.saturating_add(tolerance);
        actual_period_us >= lower && actual_period_us <= upper
    }
}

/// Runtime statistics for a single task
///
/// These statistics are updated after each task execution and can be
/// queried for monitoring and debugging purposes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskStats {
    /// Last execution time in microseconds
    pub last_execution_us: u32,

    /// Average execution time in microseconds (exponential moving average)
    ///
    /// Uses EMA with alpha = 0.1 to smooth out variations while remaining responsive
    /// to changes in execution time.
    pub avg_execution_us: u32,

    /// Maximum execution time observed in microseconds
    pub max_execution_us: u32,

    /// Number of deadline misses (execution time > budget)
    pub deadline_misses: u32,

    /// Last measured period in microseconds (time between executions)
    pub last_period_us: u32,

    /// Average jitter in microseconds (deviation from target period)
    ///
    /// Uses EMA to track typical period deviation. Lower jitter indicates
    /// more deterministic timing.
    pub avg_jitter_us: u32,

    /// Total number of executions
    pub execution_count: u64,
}

impl TaskStats {
    /// Update statistics with a new execution measurement
    ///
    /// # Arguments
    ///
    /// * `execution_us` - Duration of the task execution in microseconds
    /// * `period_us` - Time since last execution in microseconds
    /// * `target_period_us` - Expected period based on task rate
    /// * `budget_us` - Maximum allowed execution time
    pub fn update(
        &mut self,
        execution_us: u32,
        period_us: u32,
        target_period_us: u32,
        budget_us: u32,
    ) {
        self.last_execution_us = execution_us;
        self.last_period_us = period_us;
        self.execution_count = self.execution_count.saturating_add(1);

        // Update average execution time using exponential moving average (alpha = 0.1)
        // EMA formula: avg_new = alpha * value + (1 - alpha) * avg_old
        // Using fixed-point arithmetic: avg_new = (value + 9 * avg_old) / 10
        if self.avg_execution_us == 0 {
            self.avg_execution_us = execution_us;
        } else {
            self.avg_execution_us = (execution_us + 9 * self.avg_execution_us) / 10;
        }

        // Update maximum execution time
        if execution_us > self.max_execution_us {
            self.max_execution_us = execution_us;
        }

        // Detect deadline miss
        if execution_us > budget_us {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
        }

        // Calculate and update jitter (absolute deviation from target period)
        let jitter = period_us.abs_diff(target_period_us);

        if self.avg_jitter_us == 0 {
            self.avg_jitter_us = jitter;
        } else {
            self.avg_jitter_us = (jitter + 9 * self.avg_jitter_us) / 10;
        }
    }

    /// Update from a task's metadata
    pub fn record(&mut self, metadata: &TaskMetadata, execution_us: u32, period_us: u32) {
        self.update(
            execution_us,
            period_us,
            metadata.period_us(),
            metadata.budget_us,
        );
    }

    /// True once every `rate_hz` executions, for once-per-second summaries
    pub fn summary_due(&self, metadata: &TaskMetadata) -> bool {
        metadata.rate_hz > 0
            && self.execution_count > 0
            && self.execution_count % metadata.rate_hz as u64 == 0
    }

    /// Reset all statistics to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
