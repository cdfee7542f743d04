//! Cross-process lock for mutating operations.

use crate::{Result, SwitchError};

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

pub const LOCK_FILENAME: &str = "agsw.lock";
#[cfg(unix)]
const LOCK_FILE_MODE: u32 = 0o600;

/// How long an unreadable lock file counts as held. Covers a holder that
/// crashed before its content was complete.
pub(crate) const UNREADABLE_GRACE: Duration = Duration::from_secs(10);

/// Exclusive lock file in the data directory, removed on drop.
///
/// The content is staged in a private file and published with a hard link,
/// so the lock never exists half-written. A lock whose owner is gone is stale
/// and is replaced. Release only removes the file while it still carries this
/// holder's token.
#[derive(Debug)]
pub struct OperationLock {
    path: PathBuf,
    content: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    acquired_at: DateTime<Utc>,
    #[serde(default)]
    token: Uuid,
}

impl OperationLock {
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| SwitchError::io(data_dir, e))?;
        let path = data_dir.join(LOCK_FILENAME);

        let info = LockInfo {
            pid: std::process::id(),
            acquired_at: Utc::now(),
            token: Uuid::new_v4(),
        };
        let content = serde_json::to_vec(&info)?;
        let staged = data_dir.join(format!("{LOCK_FILENAME}.{}.tmp", info.token));

        if let Err(e) = write_staged(&staged, &content) {
            std::fs::remove_file(&staged).ok();
            return Err(e);
        }
        let published = Self::publish(&staged, &path);
        std::fs::remove_file(&staged).ok();
        published?;

        debug!("Acquired {}", path.display());
        Ok(Self {
            path,
            content: Some(content),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Links the staged file into place; never replaces an existing lock.
    fn publish(staged: &Path, path: &Path) -> Result<()> {
        match std::fs::hard_link(staged, path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(SwitchError::io(path, e)),
        }

        Self::clear_stale(path)?;

        std::fs::hard_link(staged, path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => SwitchError::lock_held(path, 0),
            _ => SwitchError::io(path, e),
        })
    }

    /// Removes an abandoned lock, or reports who holds it.
    fn clear_stale(path: &Path) -> Result<()> {
        let observed = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(SwitchError::io(path, e)),
        };

        match serde_json::from_slice::<LockInfo>(&observed) {
            Ok(existing) if is_process_running(existing.pid) => {
                return Err(SwitchError::lock_held(path, existing.pid));
            }
            Ok(existing) => {
                info!("Removing stale lock file (pid {} not running)", existing.pid);
            }
            Err(_) if !modified_before(path, UNREADABLE_GRACE) => {
                debug!("Lock file {} is not readable yet", path.display());
                return Err(SwitchError::lock_held(path, 0));
            }
            Err(_) => warn!("Removing abandoned lock file {}", path.display()),
        }

        // Only one contender wins the rename; the loser sees NotFound
        let aside = path.with_file_name(format!("{LOCK_FILENAME}.{}.stale", Uuid::new_v4()));
        match std::fs::rename(path, &aside) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(SwitchError::io(path, e)),
        }

        let moved = std::fs::read(&aside).unwrap_or_default();
        if moved != observed {
            // A new holder published between the read and the rename
            if let Err(e) = std::fs::hard_link(&aside, path) {
                warn!("Could not put back lock file {}: {e}", path.display());
            }
            std::fs::remove_file(&aside).ok();
            return Err(SwitchError::lock_held(path, 0));
        }

        std::fs::remove_file(&aside).ok();
        Ok(())
    }

    /// Releases the lock. Also called on drop.
    pub fn release(&mut self) {
        let Some(content) = self.content.take() else {
            return;
        };

        match std::fs::read(&self.path) {
            Ok(on_disk) if on_disk == content => {
                std::fs::remove_file(&self.path).ok();
            }
            Ok(_) => warn!(
                "Lock file {} belongs to another holder, leaving it",
                self.path.display()
            ),
            Err(e) => debug!("Lock file {} already gone: {e}", self.path.display()),
        }
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        self.release();
    }
}

fn write_staged(path: &Path, content: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(LOCK_FILE_MODE);

    let mut file = options.open(path).map_err(|e| SwitchError::io(path, e))?;
    file.write_all(content)
        .map_err(|e| SwitchError::io(path, e))?;
    file.sync_all().map_err(|e| SwitchError::io(path, e))
}

/// Whether the file was last written more than `age` ago. Unknown times count as recent.
fn modified_before(path: &Path, age: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|elapsed| elapsed > age)
}

#[cfg(unix)]
pub(crate) fn is_process_running(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    // kill(pid, 0) probes without signalling; EPERM still means the pid exists
    let rc = unsafe { libc::kill(pid as i32, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(windows)]
pub(crate) fn is_process_running(pid: u32) -> bool {
    use windows_sys::Win32::Foundation::{CloseHandle, STILL_ACTIVE};
    use windows_sys::Win32::System::Threading::{
        GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle.is_null() {
            return false;
        }

        let mut exit_code: u32 = 0;
        let result = GetExitCodeProcess(handle, &mut exit_code);
        CloseHandle(handle);

        result != 0 && exit_code == STILL_ACTIVE as u32
    }
}
