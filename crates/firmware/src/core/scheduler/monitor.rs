//! Periodic timing report for the attitude tasks
//!
//! Each task keeps its own [`TaskStats`] and calls [`report_task_stats`]
//! once per second. The report logs a one-line summary and warns on deadline
//! misses and excessive jitter.

use super::{TaskMetadata, TaskStats};

/// Jitter above this fraction of the period is worth a warning (1/10)
const HIGH_JITTER_DIVISOR: u32 = 10;

/// Warning conditions found in one report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskHealth {
    /// Deadline misses since the previous report
    pub new_deadline_misses: u32,
    /// Average jitter above a tenth of the period
    pub high_jitter: bool,
}

impl TaskHealth {
    pub fn is_nominal(&self) -> bool {
        self.new_deadline_misses == 0 && !self.high_jitter
    }
}

/// Log a task summary and return what was flagged
///
/// `misses_at_last_report` is the deadline-miss count from the previous
/// report, so only new misses are warned about.
#[allow(unused_variables)]
pub fn report_task_stats(
    metadata: &TaskMetadata,
    stats: &TaskStats,
    misses_at_last_report: u32,
) -> TaskHealth {
    crate::log_info!(
        "{}: exec={}us (avg={}us, max={}us) jitter={}us misses={} count={}",
        metadata.name,
        stats.last_execution_us,
        stats.avg_execution_us,
        stats.max_execution_us,
        stats.avg_jitter_us,
        stats.deadline_misses,
        stats.execution_count
    );

    let health = TaskHealth {
        new_deadline_misses: stats.deadline_misses.saturating_sub(misses_at_last_report),
        high_jitter: stats.avg_jitter_us > metadata.period_us() / HIGH_JITTER_DIVISOR,
    };

    if health.new_deadline_misses > 0 {
        crate::log_warn!(
            "Task '{}': {} new deadline misses (budget {}us)",
            metadata.name,
            health.new_deadline_misses,
            metadata.budget_us
        );
    }

    if health.high_jitter {
        crate::log_warn!(
            "Task '{}': high jitter {}us (target period: {}us)",
            metadata.name,
            stats.avg_jitter_us,
            metadata.period_us()
        );
    }

    health
}
