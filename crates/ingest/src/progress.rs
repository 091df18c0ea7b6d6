/// Receives human-readable status messages during an ingestion run.
///
/// Purely advisory: nothing a sink does can change the result. Sinks may be
/// handed to a background worker, hence `Send + Sync`.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _message: &str) {}
}

/// Forwards messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, message: &str) {
        tracing::info!(target: "ingest::progress", "{message}");
    }
}

/// How often the aggregator emits "N% processed" messages.
///
/// Small inputs (under 1000 rows) report about ten times, and only when there
/// are more than 100 rows; larger inputs report about a hundred times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSchedule {
    pub total: usize,
    pub interval: usize,
    pub enabled: bool,
}

impl ProgressSchedule {
    pub fn for_rows(total: usize) -> Self {
        if total < 1000 {
            Self {
                total,
                interval: (total / 10).max(1),
                enabled: total > 100,
            }
        } else {
            Self {
                total,
                interval: (total / 100).max(1),
                enabled: true,
            }
        }
    }

    /// Whether a message is due before processing row `index`.
    pub fn is_due(&self, index: usize) -> bool {
        self.enabled && index % self.interval == 0
    }

    /// Whole percent of rows processed before row `index`.
    pub fn percent(&self, index: usize) -> usize {
        if self.total == 0 {
            return 100;
        }
        index * 100 / self.total
    }
}
