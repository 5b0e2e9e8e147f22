use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 15;
pub const BASE_BACKOFF: Duration = Duration::from_secs(1);
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

pub fn backoff_for_attempt(attempt: u32) -> Duration {
    let backoff = BASE_BACKOFF.saturating_mul(1u32 << attempt.min(9));
    if backoff > MAX_BACKOFF {
        MAX_BACKOFF
    } else {
        backoff
    }
}
