use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use super::batch::PayrollBatch;
use super::clock::Clock;

/// First occurrence of `at` strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Next slot after `now`, never at or before the slot that last ran,
/// even if the wall clock has stepped back since.
pub fn next_slot(
    now: NaiveDateTime,
    last_run: Option<NaiveDateTime>,
    at: NaiveTime,
) -> NaiveDateTime {
    match last_run {
        Some(last) if last >= now => next_run_after(last, at),
        _ => next_run_after(now, at),
    }
}

/// Sleep until the wall clock reads `next` or later.
///
/// Sleeping is monotonic but `next` is wall time, so the clock is read again
/// on waking and a lagging clock means another, shorter sleep.
pub async fn sleep_until(clock: &dyn Clock, next: NaiveDateTime) {
    loop {
        let now = clock.now();
        if now >= next {
            return;
        }
        let wait = (next - now).to_std().unwrap_or_default();
        debug!(now = %now, next = %next, "Waiting for payroll time");
        actix_web::rt::time::sleep(wait).await;
    }
}

/// Run the scheduled batch every day at the payroll time, on the actix runtime.
///
/// Not coordinated with on-demand runs.
pub fn spawn_daily(batch: Arc<PayrollBatch>) {
    actix_web::rt::spawn(async move {
        let mut last_run: Option<NaiveDateTime> = None;
        loop {
            let next = next_slot(batch.clock().now(), last_run, batch.payroll_time());
            info!(next_run = %next, "Next scheduled payroll");

            sleep_until(batch.clock(), next).await;
            batch.run_scheduled_batch().await;
            last_run = Some(next);
        }
    });
}
