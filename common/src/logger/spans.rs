use std::time::Duration;

use tracing::{Span, field};

use super::TraceId;

/// Root span for one scheduling pass.
///
/// `booking_id` and `slot` are left empty and filled in by `annotate_span`
/// while the pass walks the schedule.
pub fn pass_span(trace_id: &TraceId, today: &str, dry_run: bool) -> Span {
    tracing::info_span!(
        "pass",
        trace_id = %trace_id.as_str(),
        today = %today,
        dry_run,
        booking_id = field::Empty,
        slot = field::Empty
    )
}

pub fn annotate_span(booking_id: &str, slot: Option<&str>) {
    let span = Span::current();
    span.record("booking_id", field::display(booking_id));
    if let Some(s) = slot {
        span.record("slot", field::display(s));
    }
}

pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
