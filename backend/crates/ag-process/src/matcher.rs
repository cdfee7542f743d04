use ag_config::TargetConfig;
use ag_core::{Platform, ProcessHandle};

use std::path::{Path, PathBuf};

/// Decides whether a process belongs to the foreign application.
pub trait ProcessMatcher: Send + Sync {
    fn matches(&self, handle: &ProcessHandle) -> bool;
}

/// macOS: the executable lives inside the application bundle.
#[derive(Debug, Clone)]
pub struct MacMatcher {
    bundle: String,
}

impl MacMatcher {
    pub fn new(app_name: &str) -> Self {
        Self {
            bundle: format!("{}.app", app_name.to_lowercase()),
        }
    }
}

impl ProcessMatcher for MacMatcher {
    fn matches(&self, handle: &ProcessHandle) -> bool {
        handle.exe_lowercase().contains(&self.bundle)
    }
}

/// Windows: the image name, or the install path for helpers, but never a process
/// whose name carries the manager marker.
#[derive(Debug, Clone)]
pub struct WindowsMatcher {
    image: String,
    stem: String,
    marker: String,
}

impl WindowsMatcher {
    pub fn new(app_name: &str, marker: &str) -> Self {
        let stem = app_name.to_lowercase();
        Self {
            image: format!("{stem}.exe"),
            stem,
            marker: marker.to_lowercase(),
        }
    }
}

impl ProcessMatcher for WindowsMatcher {
    fn matches(&self, handle: &ProcessHandle) -> bool {
        let name = handle.name.to_lowercase();
        if name == self.image || name == self.stem {
            return true;
        }
        handle.exe_lowercase().contains(&self.stem) && !name.contains(&self.marker)
    }
}

/// Linux: exact process name, or the install path.
#[derive(Debug, Clone)]
pub struct LinuxMatcher {
    name: String,
}

impl LinuxMatcher {
    pub fn new(app_name: &str) -> Self {
        Self {
            name: app_name.to_lowercase(),
        }
    }
}

impl ProcessMatcher for LinuxMatcher {
    fn matches(&self, handle: &ProcessHandle) -> bool {
        handle.name.to_lowercase() == self.name || handle.exe_lowercase().contains(&self.name)
    }
}

pub fn matcher_for(platform: Platform, target: &TargetConfig) -> Box<dyn ProcessMatcher> {
    match platform {
        Platform::MacOs => Box::new(MacMatcher::new(&target.app_name)),
        Platform::Windows => Box::new(WindowsMatcher::new(
            &target.app_name,
            &target.manager_marker,
        )),
        Platform::Linux => Box::new(LinuxMatcher::new(&target.app_name)),
    }
}

/// Processes that must never be touched: this tool and anything installed next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    own_pid: u32,
    own_dir: Option<PathBuf>,
}

impl ExclusionRules {
    pub fn new(own_pid: u32, own_dir: Option<PathBuf>) -> Self {
        Self { own_pid, own_dir }
    }

    /// Rules for the running binary.
    pub fn current() -> Self {
        let own_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.canonicalize().ok())
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::new(std::process::id(), own_dir)
    }

    pub fn excludes(&self, handle: &ProcessHandle) -> bool {
        if handle.pid == self.own_pid {
            return true;
        }

        match (&self.own_dir, &handle.exe_path) {
            (Some(own_dir), Some(exe)) => exe.starts_with(own_dir),
            _ => false,
        }
    }
}

/// Platform matcher plus exclusions plus an optional explicitly configured executable.
pub struct CandidateFilter {
    matcher: Box<dyn ProcessMatcher>,
    exclusions: ExclusionRules,
    executable: Option<PathBuf>,
}

impl CandidateFilter {
    pub fn new(
        matcher: Box<dyn ProcessMatcher>,
        exclusions: ExclusionRules,
        executable: Option<PathBuf>,
    ) -> Self {
        Self {
            matcher,
            exclusions,
            executable,
        }
    }

    pub fn from_target(platform: Platform, target: &TargetConfig) -> Self {
        Self::new(
            matcher_for(platform, target),
            ExclusionRules::current(),
            target.executable.as_ref().map(PathBuf::from),
        )
    }

    pub fn is_candidate(&self, handle: &ProcessHandle) -> bool {
        if self.exclusions.excludes(handle) {
            return false;
        }

        if let (Some(configured), Some(exe)) = (&self.executable, &handle.exe_path)
            && exe == configured
        {
            return true;
        }

        self.matcher.matches(handle)
    }

    pub fn classify(&self, processes: Vec<ProcessHandle>) -> Vec<ProcessHandle> {
        processes
            .into_iter()
            .filter(|p| self.is_candidate(p))
            .collect()
    }
}
