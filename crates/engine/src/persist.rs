//! Persisted bundle
//!
//! The store is written as one file:
//!
//! ```text
//! ┌────────────┬──────────────┬─────────────────────────────────┐
//! │ magic (8B) │ version (u32)│ bincode(Option<Database>, path) │
//! └────────────┴──────────────┴─────────────────────────────────┘
//! ```
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the destination, so a failed save never leaves a partial
//! file behind.

use bincode::Options;
use formdb_core::{FormError, Result};
use formdb_storage::Database;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 8] = b"FORMDB\0\0";
const FORMAT_VERSION: u32 = 1;

/// Bincode settings matching `bincode::serialize_into`, bounded by `limit`
/// bytes so a corrupt length prefix fails instead of allocating
fn codec(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}

#[derive(Serialize)]
struct BundleRef<'a> {
    database: Option<&'a Database>,
    path: &'a Path,
}

/// Contents of a persisted store
#[derive(Debug, Deserialize)]
pub struct Bundle {
    /// Persisted database, if the controller held one
    pub database: Option<Database>,
    /// Path the bundle was saved under
    pub path: PathBuf,
}

/// Atomically write `(database, path)` to `path`
pub fn write_bundle(path: &Path, database: Option<&Database>) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| FormError::persistence(&dir, e))?;

    let tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| FormError::persistence(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer
            .write_all(MAGIC)
            .and_then(|_| writer.write_all(&FORMAT_VERSION.to_le_bytes()))
            .map_err(|e| FormError::persistence(path, e))?;
        codec(u64::MAX)
            .serialize_into(&mut writer, &BundleRef { database, path })
            .map_err(|e| FormError::persistence(path, e))?;
        writer.flush().map_err(|e| FormError::persistence(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| FormError::persistence(path, e))?;
    tmp.persist(path)
        .map_err(|e| FormError::persistence(path, e.error))?;
    Ok(())
}

/// Read a bundle written by [`write_bundle`]
pub fn read_bundle(path: &Path) -> Result<Bundle> {
    let file = File::open(path).map_err(|e| FormError::persistence(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| FormError::persistence(path, e))?
        .len();
    let mut reader = BufReader::new(file);

    let mut header = [0u8; 12];
    reader
        .read_exact(&mut header)
        .map_err(|e| FormError::persistence(path, format!("truncated header: {e}")))?;
    if &header[..8] != MAGIC {
        return Err(FormError::persistence(path, "not a FormDB store"));
    }
    let version = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    if version != FORMAT_VERSION {
        return Err(FormError::persistence(
            path,
            format!("unsupported format version {version}"),
        ));
    }

    codec(len)
        .deserialize_from(reader)
        .map_err(|e| FormError::persistence(path, e))
}
