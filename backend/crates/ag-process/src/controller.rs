use crate::{
    AppShell, CandidateFilter, LaunchPlan, ProcessError, ProcessTable, Result, StopPhase,
    StopPolicy, StopReport, StopSignal, SysinfoProcessTable, SystemShell, next_phase,
};

use ag_config::Config;
use ag_core::{Platform, ProcessHandle};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

/// How `start` brings the application up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPolicy {
    pub use_uri: bool,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    AlreadyRunning,
    OpenedUri,
    Launched(LaunchPlan),
}

/// Stops and starts the foreign application.
pub struct ProcessController {
    table: Arc<dyn ProcessTable>,
    shell: Arc<dyn AppShell>,
    filter: CandidateFilter,
    stop_policy: StopPolicy,
    start_policy: StartPolicy,
}

impl ProcessController {
    pub fn new(
        table: Arc<dyn ProcessTable>,
        shell: Arc<dyn AppShell>,
        filter: CandidateFilter,
        stop_policy: StopPolicy,
        start_policy: StartPolicy,
    ) -> Self {
        Self {
            table,
            shell,
            filter,
            stop_policy,
            start_policy,
        }
    }

    /// Controller wired to the real process list and OS commands.
    pub fn from_config(config: &Config) -> Self {
        let platform = Platform::current();
        Self::new(
            Arc::new(SysinfoProcessTable::new()),
            Arc::new(SystemShell::new(
                platform,
                config.target.clone(),
                &config.process,
            )),
            CandidateFilter::from_target(platform, &config.target),
            StopPolicy::from_config(&config.process),
            StartPolicy {
                use_uri: config.process.use_uri,
                uri: config.target.uri.clone(),
            },
        )
    }

    /// Current candidate processes.
    pub async fn scan(&self) -> Vec<ProcessHandle> {
        let table = Arc::clone(&self.table);
        let processes = match tokio::task::spawn_blocking(move || table.snapshot()).await {
            Ok(processes) => processes,
            Err(e) => {
                error!("Process enumeration failed: {e}");
                Vec::new()
            }
        };

        self.filter.classify(processes)
    }

    pub async fn is_running(&self) -> bool {
        !self.scan().await.is_empty()
    }

    /// Stops the application, escalating as configured.
    ///
    /// Ends in `Failed` surface as [`ProcessError::PartialTermination`].
    pub async fn stop(&self) -> Result<StopReport> {
        let report = self.run_stop().await;

        match report.final_phase() {
            StopPhase::Failed => {
                error!(
                    "Stop failed, {} process(es) survived",
                    report.survivors.len()
                );
                Err(ProcessError::partial_termination(report.survivors))
            }
            _ => Ok(report),
        }
    }

    /// Drives the escalation table to a terminal phase.
    pub async fn run_stop(&self) -> StopReport {
        let policy = &self.stop_policy;
        let mut trace = vec![StopPhase::Scanning];

        let initial = self.scan().await;
        let mut candidates = initial.clone();
        debug!("Stop scan found {} candidate(s)", candidates.len());

        let mut settle_offset = Duration::ZERO;
        let mut phase = next_phase(StopPhase::Scanning, candidates.len(), Duration::ZERO, policy);

        while !phase.is_terminal() {
            trace.push(phase);
            info!("Stop phase {phase}");

            phase = match phase {
                StopPhase::GracefulRequested => {
                    if self.shell.request_quit().await {
                        info!("Quit request accepted");
                    } else {
                        debug!("Quit request not accepted, skipping settle");
                        settle_offset = policy.graceful_settle;
                    }
                    self.retain_alive(&mut candidates).await;
                    next_phase(phase, candidates.len(), Duration::ZERO, policy)
                }
                StopPhase::WaitingGraceful => {
                    match self.wait(phase, &mut candidates, settle_offset).await {
                        StopPhase::TermSent => {
                            // Helpers may have respawned while the app was quitting
                            candidates = self.scan().await;
                            next_phase(phase, candidates.len(), policy.graceful_settle, policy)
                        }
                        next => next,
                    }
                }
                StopPhase::TermSent => {
                    self.signal_all(&candidates, StopSignal::Terminate).await;
                    self.retain_alive(&mut candidates).await;
                    next_phase(phase, candidates.len(), Duration::ZERO, policy)
                }
                StopPhase::WaitingTerm => self.wait(phase, &mut candidates, Duration::ZERO).await,
                StopPhase::KillSent => {
                    self.signal_all(&candidates, StopSignal::Kill).await;
                    self.wait(phase, &mut candidates, Duration::ZERO).await
                }
                StopPhase::Scanning | StopPhase::Verified | StopPhase::Failed => phase,
            };
        }

        trace.push(phase);
        self.retain_alive(&mut candidates).await;

        if phase == StopPhase::Verified {
            info!("Application stopped ({} process(es))", initial.len());
        } else {
            for survivor in &candidates {
                warn!("Survivor {survivor}");
            }
        }

        StopReport {
            trace,
            initial,
            survivors: candidates,
        }
    }

    /// Starts the application unless it is already running.
    pub async fn start(&self) -> Result<StartOutcome> {
        if self.is_running().await {
            info!("Application already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        if self.start_policy.use_uri {
            if self.shell.open_uri(&self.start_policy.uri).await {
                info!("Opened {}", self.start_policy.uri);
                return Ok(StartOutcome::OpenedUri);
            }
            warn!("URI activation failed, launching directly");
        }

        let plan = self.shell.launch_direct().await?;
        Ok(StartOutcome::Launched(plan))
    }

    /// Polls liveness until the table moves out of `phase`.
    async fn wait(
        &self,
        phase: StopPhase,
        candidates: &mut Vec<ProcessHandle>,
        offset: Duration,
    ) -> StopPhase {
        let started = Instant::now();

        loop {
            self.retain_alive(candidates).await;
            let next = next_phase(
                phase,
                candidates.len(),
                started.elapsed() + offset,
                &self.stop_policy,
            );
            if next != phase {
                return next;
            }
            tokio::time::sleep(self.stop_policy.poll_interval).await;
        }
    }

    /// Drops exited candidates. A failed liveness pass keeps them all.
    async fn retain_alive(&self, candidates: &mut Vec<ProcessHandle>) {
        let table = Arc::clone(&self.table);
        let pending = std::mem::take(candidates);
        let checked = pending.clone();

        *candidates = match tokio::task::spawn_blocking(move || {
            checked
                .into_iter()
                .filter(|c| table.is_alive(c.pid))
                .collect::<Vec<_>>()
        })
        .await
        {
            Ok(alive) => alive,
            Err(e) => {
                error!("Liveness check failed: {e}");
                pending
            }
        };
    }

    async fn signal_all(&self, candidates: &[ProcessHandle], signal: StopSignal) {
        let table = Arc::clone(&self.table);
        let targets = candidates.to_vec();

        let sent = tokio::task::spawn_blocking(move || {
            for candidate in &targets {
                match table.send(candidate.pid, signal) {
                    Ok(()) => debug!("Sent {signal:?} to {candidate}"),
                    Err(e) => warn!("Could not signal {candidate}: {e}"),
                }
            }
        })
        .await;

        if let Err(e) = sent {
            error!("Signalling {signal:?} failed: {e}");
        }
    }
}
