//! Stop escalation as a transition table.
//!
//! ```text
//! Scanning ──0──▶ Verified
//!    │
//!    ▼
//! GracefulRequested ─▶ WaitingGraceful ──0──▶ Verified
//!                            │ settle elapsed
//!                            ▼
//!                        TermSent ─▶ WaitingTerm ──0──▶ Verified
//!                                        │ timeout
//!                          force_kill ┌──┴──┐ !force_kill
//!                                     ▼     ▼
//!                                KillSent  Failed
//!                                  │ 0 ─▶ Verified
//!                                  └ settle elapsed ─▶ Failed
//! ```

use ag_config::ProcessConfig;
use ag_core::ProcessHandle;

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopPhase {
    Scanning,
    GracefulRequested,
    WaitingGraceful,
    TermSent,
    WaitingTerm,
    KillSent,
    Verified,
    Failed,
}

impl StopPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, StopPhase::Verified | StopPhase::Failed)
    }
}

impl fmt::Display for StopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Timings that drive escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopPolicy {
    pub graceful_settle: Duration,
    pub term_timeout: Duration,
    pub poll_interval: Duration,
    pub kill_settle: Duration,
    pub force_kill: bool,
}

impl StopPolicy {
    pub fn from_config(config: &ProcessConfig) -> Self {
        Self {
            graceful_settle: config.graceful_settle(),
            term_timeout: config.term_timeout(),
            poll_interval: config.poll_interval(),
            kill_settle: config.kill_settle(),
            force_kill: config.force_kill,
        }
    }
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self::from_config(&ProcessConfig::default())
    }
}

/// Next phase given how many candidates are still alive and how long the
/// current phase has lasted.
pub fn next_phase(
    phase: StopPhase,
    survivors: usize,
    elapsed: Duration,
    policy: &StopPolicy,
) -> StopPhase {
    use StopPhase::*;

    if survivors == 0 && !matches!(phase, Failed) {
        return Verified;
    }

    match phase {
        Scanning => GracefulRequested,
        GracefulRequested => WaitingGraceful,
        WaitingGraceful if elapsed < policy.graceful_settle => WaitingGraceful,
        WaitingGraceful => TermSent,
        TermSent => WaitingTerm,
        WaitingTerm if elapsed < policy.term_timeout => WaitingTerm,
        WaitingTerm if policy.force_kill => KillSent,
        WaitingTerm => Failed,
        KillSent if elapsed < policy.kill_settle => KillSent,
        KillSent => Failed,
        Verified => Verified,
        Failed => Failed,
    }
}

/// What a stop run went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    /// Every phase entered, in order, ending in a terminal phase
    pub trace: Vec<StopPhase>,
    /// Candidates found by the first scan
    pub initial: Vec<ProcessHandle>,
    /// Candidates still alive at the end
    pub survivors: Vec<ProcessHandle>,
}

impl StopReport {
    pub fn final_phase(&self) -> StopPhase {
        self.trace.last().copied().unwrap_or(StopPhase::Scanning)
    }

    pub fn passed_through(&self, phase: StopPhase) -> bool {
        self.trace.contains(&phase)
    }
}
