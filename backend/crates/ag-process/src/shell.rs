use crate::{ProcessError, Result};

use ag_config::{ProcessConfig, TargetConfig};
use ag_core::Platform;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// OS-level conveniences for talking to the foreign application.
#[async_trait]
pub trait AppShell: Send + Sync {
    /// Asks the application to quit the way a user would. Returns whether the
    /// request was accepted.
    async fn request_quit(&self) -> bool;

    /// Hands the URI to the OS handler. Returns whether the opener succeeded.
    async fn open_uri(&self, uri: &str) -> bool;

    /// Launches the application directly.
    async fn launch_direct(&self) -> Result<LaunchPlan>;
}

/// How a direct launch reaches the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// Spawn this executable
    Executable(PathBuf),
    /// `open -a <app>` on macOS
    OpenApp(String),
    /// Spawn a command resolved through PATH
    PathCommand(String),
}

impl std::fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchPlan::Executable(path) => write!(f, "{}", path.display()),
            LaunchPlan::OpenApp(app) => write!(f, "open -a {app}"),
            LaunchPlan::PathCommand(cmd) => write!(f, "{cmd}"),
        }
    }
}

/// Picks the direct-launch method.
///
/// `env` resolves environment variables and `exists` checks candidate files, so
/// the Windows search order can be exercised on any host.
pub fn plan_launch(
    platform: Platform,
    target: &TargetConfig,
    env: impl Fn(&str) -> Option<OsString>,
    exists: impl Fn(&PathBuf) -> bool,
) -> Result<LaunchPlan> {
    let configured = target.executable.as_ref().map(PathBuf::from);

    match platform {
        Platform::MacOs => match configured {
            Some(path) if exists(&path) => Ok(LaunchPlan::Executable(path)),
            _ => Ok(LaunchPlan::OpenApp(target.app_name.clone())),
        },
        Platform::Windows => {
            let image = target.image_name();
            let mut searched: Vec<PathBuf> = configured.into_iter().collect();

            if let Some(local) = env("LOCALAPPDATA") {
                searched.push(
                    PathBuf::from(local)
                        .join("Programs")
                        .join(&target.app_name)
                        .join(&image),
                );
            }
            for (var, fallback) in [
                ("ProgramFiles", "C:\\Program Files"),
                ("ProgramFiles(x86)", "C:\\Program Files (x86)"),
            ] {
                let base = env(var)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(fallback));
                searched.push(base.join(&target.app_name).join(&image));
            }

            match searched.iter().find(|p| exists(p)) {
                Some(path) => Ok(LaunchPlan::Executable(path.clone())),
                None => Err(ProcessError::executable_not_found(
                    target.app_name.clone(),
                    searched,
                )),
            }
        }
        Platform::Linux => match configured {
            Some(path) if exists(&path) => Ok(LaunchPlan::Executable(path)),
            Some(path) => Err(ProcessError::executable_not_found(
                target.app_name.clone(),
                vec![path],
            )),
            None => Ok(LaunchPlan::PathCommand(target.process_name())),
        },
    }
}

/// Shell backed by the real OS commands.
pub struct SystemShell {
    platform: Platform,
    target: TargetConfig,
    graceful_timeout: Duration,
    uri_timeout: Duration,
}

impl SystemShell {
    pub fn new(platform: Platform, target: TargetConfig, process: &ProcessConfig) -> Self {
        Self {
            platform,
            target,
            graceful_timeout: process.graceful_timeout(),
            uri_timeout: process.uri_timeout(),
        }
    }

    /// Runs a short-lived helper command, bounded by `limit`.
    async fn run_bounded(&self, program: &str, args: &[&str], limit: Duration) -> bool {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        {
            use windows_sys::Win32::System::Threading::CREATE_NO_WINDOW;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        match tokio::time::timeout(limit, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => true,
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                debug!("{program} exited with {}: {}", output.status, stderr.trim());
                false
            }
            Ok(Err(e)) => {
                warn!("Failed to run {program}: {e}");
                false
            }
            Err(_) => {
                warn!("{program} did not finish within {}ms", limit.as_millis());
                false
            }
        }
    }

    fn spawn_detached(&self, plan: &LaunchPlan) -> Result<()> {
        let mut cmd = match plan {
            LaunchPlan::Executable(path) => {
                let mut cmd = StdCommand::new(path);
                cmd.args(&self.target.launch_args);
                cmd
            }
            LaunchPlan::OpenApp(app) => {
                let mut cmd = StdCommand::new("open");
                cmd.args(["-a", app.as_str()]);
                if !self.target.launch_args.is_empty() {
                    cmd.arg("--args").args(&self.target.launch_args);
                }
                cmd
            }
            LaunchPlan::PathCommand(program) => {
                let mut cmd = StdCommand::new(program);
                cmd.args(&self.target.launch_args);
                cmd
            }
        };

        // Detach so the app outlives this process
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            use windows_sys::Win32::System::Threading::{
                CREATE_NEW_PROCESS_GROUP, DETACHED_PROCESS,
            };
            cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match cmd.spawn() {
            Ok(child) => {
                info!("Launched {plan} (pid {})", child.id());
                drop(child);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                ProcessError::executable_not_found(self.target.app_name.clone(), Vec::new()),
            ),
            Err(e) => Err(ProcessError::launch(plan.to_string(), e)),
        }
    }
}

#[async_trait]
impl AppShell for SystemShell {
    async fn request_quit(&self) -> bool {
        match self.platform {
            Platform::MacOs => {
                let script = format!("tell application \"{}\" to quit", self.target.app_name);
                self.run_bounded("osascript", &["-e", script.as_str()], self.graceful_timeout)
                    .await
            }
            Platform::Windows => {
                let image = self.target.image_name();
                self.run_bounded(
                    "taskkill",
                    &["/IM", image.as_str(), "/T"],
                    self.graceful_timeout,
                )
                .await
            }
            Platform::Linux => false,
        }
    }

    async fn open_uri(&self, uri: &str) -> bool {
        match self.platform {
            Platform::MacOs => self.run_bounded("open", &[uri], self.uri_timeout).await,
            Platform::Windows => {
                self.run_bounded("cmd", &["/C", "start", "", uri], self.uri_timeout)
                    .await
            }
            Platform::Linux => self.run_bounded("xdg-open", &[uri], self.uri_timeout).await,
        }
    }

    async fn launch_direct(&self) -> Result<LaunchPlan> {
        let plan = plan_launch(
            self.platform,
            &self.target,
            |var| std::env::var_os(var),
            |path| path.is_file(),
        )?;
        self.spawn_detached(&plan)?;
        Ok(plan)
    }
}
