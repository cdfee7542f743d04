use crate::commands::Commands;
use crate::output;

use ag_config::Config;
use ag_core::IdentityRecord;
use ag_process::{AppStatus, ProcessController, StatusMonitor};
use ag_switch::{IdentitySwitcher, Result};

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

/// Applies per-command flags on top of the loaded configuration.
pub fn apply_overrides(config: &mut Config, command: &Commands) {
    if let Commands::Stop { no_force: true } = command {
        config.process.force_kill = false;
    }
}

/// Applies command flags, then validates. Runs before anything touches disk.
pub fn prepare_config(mut config: Config, command: &Commands) -> Result<Config> {
    apply_overrides(&mut config, command);
    config.validate()?;
    Ok(config)
}

/// Accepts `y` / `yes` in any case.
pub fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Command handlers over a wired switcher. Each returns the text to print.
pub struct App {
    switcher: IdentitySwitcher,
    status_poll: Duration,
}

impl App {
    pub fn new(switcher: IdentitySwitcher, status_poll: Duration) -> Self {
        Self {
            switcher,
            status_poll,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let controller = Arc::new(ProcessController::from_config(config));
        Ok(Self::new(
            IdentitySwitcher::from_config(config, controller)?,
            config.process.status_poll(),
        ))
    }

    fn controller(&self) -> &Arc<ProcessController> {
        self.switcher.controller()
    }

    pub async fn list(&self) -> Result<String> {
        let records = self.switcher.list()?;
        let current = self.switcher.current().await?.map(|r| r.id);
        Ok(output::identity_table(&records, current))
    }

    pub async fn add(&self, name: Option<String>, email: Option<String>) -> Result<String> {
        let record = self.switcher.capture(name, email).await?;
        Ok(output::captured(&record))
    }

    pub async fn switch(&self, selector: &str) -> Result<String> {
        let id = self.switcher.resolve(selector)?;
        let outcome = self.switcher.switch(id).await?;
        Ok(output::switch_outcome(&outcome))
    }

    /// Record a selector refers to, for confirmation prompts.
    pub fn lookup(&self, selector: &str) -> Result<IdentityRecord> {
        let id = self.switcher.resolve(selector)?;
        let record = self
            .switcher
            .list()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ag_switch::SwitchError::unknown_identity(selector))?;
        Ok(record)
    }

    pub async fn delete(&self, selector: &str) -> Result<String> {
        let id = self.switcher.resolve(selector)?;
        let record = self.switcher.delete(id).await?;
        Ok(format!(
            "Deleted {} <{}>\n",
            record.display_name, record.email
        ))
    }

    pub async fn start(&self) -> Result<String> {
        let outcome = self.controller().start().await?;
        Ok(output::start_outcome(&outcome))
    }

    pub async fn stop(&self) -> Result<String> {
        let report = self.controller().stop().await?;
        Ok(output::stop_report(&report))
    }

    pub async fn status(&self) -> Result<String> {
        let pids: Vec<u32> = self.controller().scan().await.iter().map(|p| p.pid).collect();
        let status = if pids.is_empty() {
            AppStatus::Stopped
        } else {
            AppStatus::Running { pids }
        };
        let current = self.switcher.current().await?;
        Ok(output::status(&status, current.as_ref()))
    }

    /// Reports every status change until Ctrl-C.
    pub async fn watch(&self, mut emit: impl FnMut(String)) -> Result<()> {
        let monitor = StatusMonitor::spawn(Arc::clone(self.controller()), self.status_poll);
        let mut status_rx = monitor.subscribe();
        info!("Watching application status every {:?}", self.status_poll);

        loop {
            tokio::select! {
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = status_rx.borrow_and_update().clone();
                    if status == AppStatus::Unknown {
                        continue;
                    }
                    let current = self.switcher.current().await?;
                    emit(output::status(&status, current.as_ref()));
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        monitor.shutdown().await;
        Ok(())
    }

    pub async fn prune(&self) -> Result<String> {
        let report = self.switcher.prune().await?;
        Ok(output::prune_report(&report))
    }
}
