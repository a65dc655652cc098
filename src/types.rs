//! Shared identifier and timestamp types.

use chrono::Utc;

/// External node identifier, unique within a context
pub type NodeId = String;

/// Generated context identifier
pub type ContextId = String;

/// Generated path identifier
pub type PathId = String;

/// Seconds since the unix epoch, fractional
pub type Timestamp = f64;

/// Current wall-clock time as fractional unix seconds.
pub fn now_secs() -> Timestamp {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Fresh random identifier (UUID v4, hyphenated).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
