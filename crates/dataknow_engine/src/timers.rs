use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::{EngineEvent, EventSink, TimerKey};

/// Emits one `UploadTick` per `period` until the task is aborted.
///
/// The first tick fires one period after start, so intake is visible at 0%.
pub async fn run_upload_ticker(document: u64, period: Duration, sink: &dyn EventSink) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        sink.emit(EngineEvent::UploadTick { document });
    }
}

/// Emits `TimerFired(key)` once after `delay`.
pub async fn fire_after(key: TimerKey, delay: Duration, sink: &dyn EventSink) {
    tokio::time::sleep(delay).await;
    sink.emit(EngineEvent::TimerFired(key));
}
