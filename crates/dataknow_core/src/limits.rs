use std::time::Duration;

/// Maximum number of documents the registry may hold.
pub const MAX_FILES: usize = 10;

/// Largest accepted file, in bytes (100 MiB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Lowercase extensions accepted at intake.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "txt", "csv"];

/// Progress added by one simulated upload tick.
pub const PROGRESS_STEP: u8 = 10;

/// Progress at which an upload is considered transferred.
pub const PROCESSING_THRESHOLD: u8 = 90;

/// Delays and intervals the reducer hands to the engine through effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Tick period of the first document in an intake batch.
    pub tick_base: Duration,
    /// Extra tick period per position in the batch, so uploads do not move in lockstep.
    pub tick_increment: Duration,
    /// Delay between `Processing` and `Completed`.
    pub promotion_delay: Duration,
    /// Lifetime of a rejection notice.
    pub notice_ttl: Duration,
    /// Pause between two job status queries.
    pub poll_interval: Duration,
    /// Status queries issued before a job is declared timed out.
    pub max_poll_attempts: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            tick_base: Duration::from_millis(100),
            tick_increment: Duration::from_millis(50),
            promotion_delay: Duration::from_millis(500),
            notice_ttl: Duration::from_secs(5),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 150,
        }
    }
}

impl Timings {
    /// Tick period for the document at `index` within its intake batch.
    pub fn tick_period(&self, index: usize) -> Duration {
        let steps = u32::try_from(index).unwrap_or(u32::MAX);
        self.tick_base
            .saturating_add(self.tick_increment.saturating_mul(steps))
    }
}
