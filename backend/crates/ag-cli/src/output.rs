//! Plain-text rendering of command results.

use ag_core::IdentityRecord;
use ag_process::{AppStatus, StartOutcome, StopPhase, StopReport};
use ag_switch::{PruneReport, SwitchOutcome};

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

fn when(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => String::from("never"),
    }
}

/// Numbered identity table; `current` gets a `*` marker.
pub fn identity_table(records: &[IdentityRecord], current: Option<Uuid>) -> String {
    if records.is_empty() {
        return String::from("No saved identities. Sign in to the application and run `agsw add`.\n");
    }

    let name_width = records
        .iter()
        .map(|r| r.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    let email_width = records
        .iter()
        .map(|r| r.email.chars().count())
        .max()
        .unwrap_or(0)
        .max("EMAIL".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "    #  {:<name_width$}  {:<email_width$}  LAST USED         ID",
        "NAME", "EMAIL"
    );
    for (index, record) in records.iter().enumerate() {
        let marker = if Some(record.id) == current { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:>3}  {:<name_width$}  {:<email_width$}  {:<16}  {}",
            index + 1,
            record.display_name,
            record.email,
            when(record.last_used_at),
            record.id
        );
    }
    out
}

pub fn captured(record: &IdentityRecord) -> String {
    format!(
        "Saved {} <{}> ({})\n",
        record.display_name, record.email, record.id
    )
}

pub fn stop_report(report: &StopReport) -> String {
    if report.initial.is_empty() {
        return String::from("Application is not running.\n");
    }

    let forced = if report.passed_through(StopPhase::KillSent) {
        " (forced)"
    } else {
        ""
    };
    match report.final_phase() {
        StopPhase::Verified => format!(
            "Stopped {} process(es){forced}.\n",
            report.initial.len()
        ),
        phase => {
            let survivors: Vec<String> = report.survivors.iter().map(ToString::to_string).collect();
            format!("Stop ended in {phase}; still running: {}\n", survivors.join(", "))
        }
    }
}

pub fn start_outcome(outcome: &StartOutcome) -> String {
    match outcome {
        StartOutcome::AlreadyRunning => String::from("Application is already running.\n"),
        StartOutcome::OpenedUri => String::from("Application activated through its URI.\n"),
        StartOutcome::Launched(plan) => format!("Launched {plan}.\n"),
    }
}

pub fn switch_outcome(outcome: &SwitchOutcome) -> String {
    let mut out = String::new();

    if let Some(report) = &outcome.stop_report {
        out.push_str(&stop_report(report));
    }
    if let Some(e) = &outcome.stop_error {
        let _ = writeln!(out, "Warning: application did not fully stop: {e}");
    }
    for (path, reason) in &outcome.failed_locations {
        let _ = writeln!(out, "Warning: not restored into {}: {reason}", path.display());
    }
    let _ = writeln!(
        out,
        "Switched to {} <{}> ({} location(s) restored)",
        outcome.record.display_name,
        outcome.record.email,
        outcome.restored.len()
    );
    match (&outcome.start, &outcome.start_error) {
        (Some(start), _) => out.push_str(&start_outcome(start)),
        (None, Some(e)) => {
            let _ = writeln!(out, "Warning: application not started: {e}");
        }
        (None, None) => {}
    }
    out
}

pub fn status(status: &AppStatus, current: Option<&IdentityRecord>) -> String {
    let app = match status {
        AppStatus::Unknown => String::from("unknown"),
        AppStatus::Stopped => String::from("stopped"),
        AppStatus::Running { pids } => {
            let pids: Vec<String> = pids.iter().map(u32::to_string).collect();
            format!("running (pid {})", pids.join(", "))
        }
    };
    let identity = match current {
        Some(record) => format!("{} <{}>", record.display_name, record.email),
        None => String::from("not a saved identity"),
    };
    format!("Application: {app}\nIdentity:    {identity}\n")
}

pub fn prune_report(report: &PruneReport) -> String {
    if report.removed_records.is_empty() && report.removed_files.is_empty() {
        return String::from("Nothing to prune.\n");
    }

    let mut out = String::new();
    for record in &report.removed_records {
        let _ = writeln!(
            out,
            "Removed {} <{}> (snapshot missing)",
            record.display_name, record.email
        );
    }
    for path in &report.removed_files {
        let _ = writeln!(out, "Deleted unreferenced {}", path.display());
    }
    out
}
