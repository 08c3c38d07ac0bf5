//! Time-based id allocation.
//!
//! Conversation and message ids are millisecond timestamps rendered as
//! strings. Two allocations inside the same millisecond must not collide,
//! so the allocator bumps past the last value it handed out.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Allocate an id unique within this process.
pub fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let id = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now);
    id.to_string()
}
