use crate::{ProcessError, Result};

use ag_core::ProcessHandle;

use std::sync::Mutex;

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use tracing::debug;

/// How hard to ask a process to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGTERM / taskkill without /F
    Terminate,
    /// SIGKILL / taskkill /F
    Kill,
}

/// The operating system's process list, behind a seam so escalation can be
/// exercised without real processes.
pub trait ProcessTable: Send + Sync {
    fn snapshot(&self) -> Vec<ProcessHandle>;

    fn is_alive(&self, pid: u32) -> bool;

    /// Delivers a signal. A process that already exited is not an error.
    fn send(&self, pid: u32, signal: StopSignal) -> Result<()>;
}

pub struct SysinfoProcessTable {
    system: Mutex<System>,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn snapshot(&self) -> Vec<ProcessHandle> {
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_processes(ProcessesToUpdate::All, true);

        system
            .processes()
            .iter()
            // Linux lists every task; keep only the process itself
            .filter(|(_, process)| {
                process.thread_kind().is_none() && process.status() != ProcessStatus::Zombie
            })
            .map(|(pid, process)| {
                ProcessHandle::new(
                    pid.as_u32(),
                    process.name().to_string_lossy(),
                    process.exe().map(|p| p.to_path_buf()),
                )
            })
            .collect()
    }

    fn is_alive(&self, pid: u32) -> bool {
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        let target = Pid::from_u32(pid);
        system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);

        system
            .process(target)
            .is_some_and(|p| p.status() != ProcessStatus::Zombie)
    }

    #[cfg(unix)]
    fn send(&self, pid: u32, signal: StopSignal) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid as NixPid;

        let sig = match signal {
            StopSignal::Terminate => Signal::SIGTERM,
            StopSignal::Kill => Signal::SIGKILL,
        };

        match kill(NixPid::from_raw(pid as i32), sig) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!("pid {pid} already gone");
                Ok(())
            }
            Err(e) => Err(ProcessError::signal(pid, e.to_string())),
        }
    }

    #[cfg(windows)]
    fn send(&self, pid: u32, signal: StopSignal) -> Result<()> {
        use std::os::windows::process::CommandExt;
        use windows_sys::Win32::System::Threading::CREATE_NO_WINDOW;

        let pid_arg = pid.to_string();
        let mut args = vec!["/PID", pid_arg.as_str(), "/T"];
        if signal == StopSignal::Kill {
            args.push("/F");
        }

        let output = std::process::Command::new("taskkill")
            .args(&args)
            .creation_flags(CREATE_NO_WINDOW)
            .output()
            .map_err(|e| ProcessError::signal(pid, e.to_string()))?;

        if output.status.success() || !self.is_alive(pid) {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("taskkill {pid} reported: {}", stderr.trim());
        Err(ProcessError::signal(pid, stderr.trim()))
    }
}
