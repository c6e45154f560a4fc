//! # Snapshot Persistence
//!
//! Serializes the full table set to a snapshot file so permits and votes
//! survive a process restart.
//!
//! Format: `[MAGIC][VERSION][BINCODE TABLES]`
//!
//! Snapshots are written to a temporary sibling file and renamed into
//! place, so a crash mid-write leaves the previous snapshot intact.

use crate::errors::StoreError;
use crate::memory::Tables;
use std::fs;
use std::path::Path;
use tracing::trace;

/// Magic bytes for the snapshot file.
const SNAPSHOT_MAGIC: &[u8; 8] = b"CVSTORE\x01";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u16 = 1;

/// Writes the table set to `path`, atomically replacing any previous file.
pub(crate) fn save(path: &Path, tables: &Tables) -> Result<(), StoreError> {
    let mut buf = Vec::with_capacity(4096);
    buf.extend_from_slice(SNAPSHOT_MAGIC);
    buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());

    let payload =
        bincode::serialize(tables).map_err(|e| StoreError::Io(format!("encode: {e}")))?;
    buf.extend_from_slice(&payload);

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &buf).map_err(|e| StoreError::Io(format!("write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| StoreError::Io(format!("rename {}: {e}", path.display())))?;

    trace!(path = %path.display(), bytes = buf.len(), "Snapshot written");
    Ok(())
}

/// Reads a table set back from `path`, validating magic and version.
pub(crate) fn load(path: &Path) -> Result<Tables, StoreError> {
    let bytes =
        fs::read(path).map_err(|e| StoreError::Io(format!("read {}: {e}", path.display())))?;

    let header_len = SNAPSHOT_MAGIC.len() + 2;
    if bytes.len() < header_len {
        return Err(StoreError::SnapshotCorrupted("truncated header".to_string()));
    }
    if &bytes[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(StoreError::SnapshotCorrupted("bad magic".to_string()));
    }

    let version = u16::from_le_bytes([bytes[8], bytes[9]]);
    if version != SNAPSHOT_VERSION {
        return Err(StoreError::SnapshotCorrupted(format!(
            "unsupported version {version}"
        )));
    }

    bincode::deserialize(&bytes[header_len..])
        .map_err(|e| StoreError::SnapshotCorrupted(format!("decode: {e}")))
}
