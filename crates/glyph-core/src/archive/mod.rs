//! Archival Store
//!
//! Durable, batch-flushed tier for glyphs evicted from the live set:
//! - Archived records are buffered in memory
//! - Every `flush_every` archive calls the whole archived set is written out
//! - The store flushes on `close()` and, best effort, on drop
//!
//! A crash can lose at most `flush_every - 1` unflushed records. Failed
//! flushes keep the buffer and are retried on the next archive call.

mod record;

pub use record::ArchiveRecord;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::glyph::Glyph;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Archive calls between durable writes
pub const DEFAULT_FLUSH_EVERY: usize = 10;

/// Current on-disk format version
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// File name used under the platform data directory
pub const DEFAULT_ARCHIVE_FILE: &str = "glyph_archive.json";

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Archive error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Archive result type
pub type Result<T> = std::result::Result<T, ArchiveError>;

// ============================================================================
// ON-DISK FORMAT
// ============================================================================

#[derive(Serialize)]
struct ArchiveFileRef<'a> {
    format_version: u32,
    flushed_at: DateTime<Utc>,
    glyphs: &'a BTreeMap<String, ArchiveRecord>,
}

#[derive(Deserialize)]
struct ArchiveFile {
    format_version: u32,
    #[allow(dead_code)]
    flushed_at: Option<DateTime<Utc>>,
    glyphs: BTreeMap<String, ArchiveRecord>,
}

/// Either the versioned envelope or a bare id -> record map
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredArchive {
    Versioned(ArchiveFile),
    Bare(BTreeMap<String, ArchiveRecord>),
}

/// Resolve the per-user default archive location
pub fn default_archive_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "glyph", "memory").ok_or_else(|| {
        ArchiveError::Init("Could not determine project directories".to_string())
    })?;
    Ok(proj_dirs.data_dir().join(DEFAULT_ARCHIVE_FILE))
}

// ============================================================================
// ARCHIVAL STORE
// ============================================================================

/// Batched archive of evicted glyphs
#[derive(Debug)]
pub struct ArchivalStore {
    path: Option<PathBuf>,
    records: BTreeMap<String, ArchiveRecord>,
    pending: usize,
    flush_every: usize,
    flush_count: u64,
    failed_flushes: u64,
}

impl ArchivalStore {
    /// Open a store backed by `path`, loading whatever it already holds
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty; the next flush overwrites it.
    pub fn open(path: impl Into<PathBuf>, flush_every: usize) -> Self {
        let path = path.into();
        let records = load_records(&path);
        Self {
            path: Some(path),
            records,
            pending: 0,
            flush_every: flush_every.max(1),
            flush_count: 0,
            failed_flushes: 0,
        }
    }

    /// A store with no backing file; flushes only reset the pending count
    pub fn in_memory(flush_every: usize) -> Self {
        Self {
            path: None,
            records: BTreeMap::new(),
            pending: 0,
            flush_every: flush_every.max(1),
            flush_count: 0,
            failed_flushes: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of archived records (loaded plus archived this session)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records archived since the last successful flush
    pub fn pending_len(&self) -> usize {
        self.pending
    }

    /// Successful flushes since the store was opened
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    /// Failed flush attempts since the store was opened
    pub fn failed_flushes(&self) -> u64 {
        self.failed_flushes
    }

    pub fn flush_every(&self) -> usize {
        self.flush_every
    }

    pub fn get(&self, id: &str) -> Option<&ArchiveRecord> {
        self.records.get(id)
    }

    /// All records, ordered by id
    pub fn records(&self) -> impl Iterator<Item = &ArchiveRecord> {
        self.records.values()
    }

    /// Rebuild a glyph from its archived snapshot
    pub fn restore_glyph(&self, id: &str) -> Option<Glyph> {
        self.records.get(id).cloned().map(Glyph::from)
    }

    /// Buffer a snapshot of `glyph`, flushing once a full batch is pending
    ///
    /// A flush failure is logged and the batch stays buffered; the next call
    /// tries again.
    pub fn archive(&mut self, glyph: &Glyph) {
        self.records
            .insert(glyph.id.clone(), ArchiveRecord::from(glyph));
        self.pending += 1;

        if self.pending >= self.flush_every {
            if let Err(e) = self.flush() {
                tracing::warn!(
                    pending = self.pending,
                    "Archive flush failed, keeping buffer for retry: {}",
                    e
                );
            }
        }
    }

    /// Write the full archived set to disk
    pub fn flush(&mut self) -> Result<()> {
        if let Some(path) = &self.path {
            if let Err(e) = write_records(path, &self.records) {
                self.failed_flushes += 1;
                return Err(e);
            }
            tracing::info!(
                records = self.records.len(),
                flushed = self.pending,
                "Archive flushed to {}",
                path.display()
            );
        }

        self.pending = 0;
        self.flush_count += 1;
        Ok(())
    }

    /// Flush anything pending and release the store
    pub fn close(mut self) -> Result<()> {
        if self.pending > 0 {
            self.flush()?;
        }
        Ok(())
    }
}

impl Drop for ArchivalStore {
    fn drop(&mut self) {
        if self.pending > 0 {
            if let Err(e) = self.flush() {
                tracing::warn!(
                    lost = self.pending,
                    "Archive flush on shutdown failed: {}",
                    e
                );
            }
        }
    }
}

fn load_records(path: &Path) -> BTreeMap<String, ArchiveRecord> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No archive at {}, starting empty", path.display());
            return BTreeMap::new();
        }
        Err(e) => {
            tracing::warn!("Failed to read archive {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    match serde_json::from_str::<StoredArchive>(&contents) {
        Ok(StoredArchive::Versioned(file)) if file.format_version <= ARCHIVE_FORMAT_VERSION => {
            tracing::info!(records = file.glyphs.len(), "Loaded archive {}", path.display());
            file.glyphs
        }
        Ok(StoredArchive::Versioned(file)) => {
            tracing::warn!(
                "Archive {} has unsupported format version {}, starting empty",
                path.display(),
                file.format_version
            );
            BTreeMap::new()
        }
        Ok(StoredArchive::Bare(glyphs)) => {
            tracing::info!(records = glyphs.len(), "Loaded archive {}", path.display());
            glyphs
        }
        Err(e) => {
            tracing::warn!("Corrupt archive {}, starting empty: {}", path.display(), e);
            BTreeMap::new()
        }
    }
}

/// Write to a synced sibling temp file, then rename over the target
fn write_records(path: &Path, records: &BTreeMap<String, ArchiveRecord>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(
        &mut writer,
        &ArchiveFileRef {
            format_version: ARCHIVE_FORMAT_VERSION,
            flushed_at: Utc::now(),
            glyphs: records,
        },
    )?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);

    // Restrict archive permissions to owner-only on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(&tmp_path, perms);
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
