//! Identifiers for locally created records.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marker prefix reserved for records that only exist locally.
pub const LOCAL_ID_PREFIX: &str = "custom-";

/// Returns true if the id was synthesized locally rather than sourced upstream.
pub fn is_local_id(id: &str) -> bool {
  id.starts_with(LOCAL_ID_PREFIX)
}

/// Strategy for synthesizing local-origin ids.
pub trait IdGenerator: Send + Sync {
  /// Produce a new id carrying [`LOCAL_ID_PREFIX`].
  fn next_id(&self) -> String;
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Timestamp plus a process-wide counter, so two ids minted within the same
/// millisecond still differ.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalIdGenerator;

impl IdGenerator for LocalIdGenerator {
  fn next_id(&self) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}{}-{}", LOCAL_ID_PREFIX, Utc::now().timestamp_millis(), seq)
  }
}
