use crate::{Result, SwitchError};

use std::fs;
use std::io::Write;
use std::path::Path;

/// Replaces `path` with `bytes` so readers see either the old or the new file.
///
/// 1. Writes to a sibling temp file
/// 2. Syncs to disk (fsync)
/// 3. Renames over the destination
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| SwitchError::io(path, std::io::Error::other("path has no parent")))?;
    fs::create_dir_all(parent).map_err(|e| SwitchError::io(parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!("{file_name}.tmp.{}", std::process::id()));

    {
        let mut file = fs::File::create(&temp_path).map_err(|e| SwitchError::io(&temp_path, e))?;

        file.write_all(bytes)
            .map_err(|e| SwitchError::io(&temp_path, e))?;

        file.sync_all()
            .map_err(|e| SwitchError::io(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SwitchError::atomic_rename(temp_path.clone(), path.to_path_buf(), e)
    })?;

    Ok(())
}
