//! Lifecycle control of the foreign desktop application.
//!
//! Discovery runs through a [`ProcessTable`] and platform [`ProcessMatcher`]s,
//! stopping follows the escalation table in [`stop`], and launching goes
//! through an [`AppShell`]. Production code wires the system implementations;
//! tests drive the controller with fakes.

pub mod controller;
pub mod error;
pub mod matcher;
pub mod monitor;
pub mod shell;
pub mod stop;
pub mod table;

#[cfg(test)]
mod tests;

pub use controller::{ProcessController, StartOutcome, StartPolicy};
pub use error::{ProcessError, Result};
pub use matcher::{
    CandidateFilter, ExclusionRules, LinuxMatcher, MacMatcher, ProcessMatcher, WindowsMatcher,
    matcher_for,
};
pub use monitor::{AppStatus, StatusMonitor};
pub use shell::{AppShell, LaunchPlan, SystemShell, plan_launch};
pub use stop::{StopPhase, StopPolicy, StopReport, next_phase};
pub use table::{ProcessTable, StopSignal, SysinfoProcessTable};
