//! Identifier minting for migrated sessions and blocks.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Mint a new identifier: `<prefix>_<unix millis>_<counter>_<random>`.
///
/// The process-wide counter makes ids unique within a process even when two
/// are minted in the same millisecond; the uuid suffix keeps them unlikely to
/// collide across processes.
pub fn generate_id(prefix: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        seq,
        &random[..8]
    )
}

/// Deterministic block id derived from the owning session id
pub fn block_id(session_id: &str, kind: &str, index: usize) -> String {
    format!("{}-{}-{}", session_id, kind, index)
}
