use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock unix seconds; `last_update` stamps and staleness checks use it.
#[inline]
pub fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
