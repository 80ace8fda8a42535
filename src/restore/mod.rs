mod bus;
mod fetch;
mod run_loop;

pub use bus::{RestoreBus, RestoreRequest};
pub use run_loop::spawn_restore_loop;

pub(crate) use fetch::missing_token_snapshot;

use crate::types::{SessionSnapshot, SessionStatus};

/// Polling stops while the user is signed out or the token was rejected;
/// there is nothing to re-validate until a login writes a new token.
pub(crate) fn should_pause_polling(snapshot: &SessionSnapshot) -> bool {
    matches!(
        snapshot.status(),
        SessionStatus::MissingToken | SessionStatus::Unauthorized
    )
}

fn compute_next_delay_ms_with_nanos(base_ms: u64, ratio: f64, nanos: i128) -> u64 {
    let frac = ((nanos % 1000) as f64) / 1000.0;
    let delta = (frac * 2.0 - 1.0) * (base_ms as f64 * ratio);
    ((base_ms as f64 + delta).max(1000.0)) as u64
}

pub(crate) fn compute_next_delay_ms(
    restore_interval_seconds: u64,
    snapshot: &SessionSnapshot,
) -> u64 {
    let base_seconds = restore_interval_seconds.max(30);
    let configured_base_ms = base_seconds * 1000;

    let (base_ms, ratio) = if snapshot.status() == SessionStatus::RateLimited {
        (5 * 60 * 1000, 0.2)
    } else {
        (configured_base_ms, 0.1)
    };

    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    compute_next_delay_ms_with_nanos(base_ms, ratio, nanos)
}

pub(crate) fn compute_next_delay_for_latest(
    restore_interval_seconds: u64,
    snapshot: Option<&SessionSnapshot>,
) -> Option<u64> {
    let Some(snapshot) = snapshot else {
        return Some(60_000);
    };

    if should_pause_polling(snapshot) {
        None
    } else {
        Some(compute_next_delay_ms(restore_interval_seconds, snapshot))
    }
}
