use std::time::{Duration, Instant};

/// Logs the time spent in `l_step` since `last` and returns the new elapsed mark.
pub(crate) fn trace(l_type: &str, l_step: &str, start: Instant, last: Duration) -> Duration {
    let elapsed = start.elapsed();
    log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, elapsed, l_step, elapsed - last);
    elapsed
}
