use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{RelayError, Result};

/// Writes content to a file atomically using temp file + rename.
///
/// Readers in other processes see either the previous file or the new one,
/// never a partial write. The rename is atomic on the same filesystem, so the
/// temp file is created next to the target.
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| RelayError::NoParentDir(path.to_path_buf()))?;

    fs_err::create_dir_all(dir).map_err(|e| RelayError::Io {
        context: format!("creating {}", dir.display()),
        source: e,
    })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RelayError::Io {
        context: format!("creating temp file in {}", dir.display()),
        source: e,
    })?;

    tmp.write_all(contents.as_bytes())
        .map_err(|e| RelayError::Io {
            context: format!("writing temp file for {}", path.display()),
            source: e,
        })?;

    tmp.flush().map_err(|e| RelayError::Io {
        context: format!("flushing temp file for {}", path.display()),
        source: e,
    })?;

    tmp.persist(path).map_err(|e| RelayError::Io {
        context: format!("persisting temp file to {}", path.display()),
        source: e.error,
    })?;

    Ok(())
}
