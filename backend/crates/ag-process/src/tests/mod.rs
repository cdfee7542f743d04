mod table;

use crate::{
    AppShell, CandidateFilter, ExclusionRules, LaunchPlan, LinuxMatcher, ProcessController,
    ProcessError, ProcessTable, StartPolicy, StopPolicy, StopSignal,
};

use ag_core::ProcessHandle;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

pub(crate) const OWN_PID: u32 = 1;

/// How a fake process reacts to each signal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Behaviour {
    pub honors_term: bool,
    pub honors_kill: bool,
}

pub(crate) const COOPERATIVE: Behaviour = Behaviour {
    honors_term: true,
    honors_kill: true,
};
pub(crate) const IGNORES_TERM: Behaviour = Behaviour {
    honors_term: false,
    honors_kill: true,
};
pub(crate) const UNKILLABLE: Behaviour = Behaviour {
    honors_term: false,
    honors_kill: false,
};

/// In-memory process list that reacts to signals per process.
#[derive(Default)]
pub(crate) struct FakeProcessTable {
    processes: Mutex<BTreeMap<u32, (ProcessHandle, Behaviour)>>,
    pub signals: Mutex<Vec<(u32, StopSignal)>>,
    /// Threads that ran liveness checks or signals
    callers: Mutex<Vec<std::thread::ThreadId>>,
}

impl FakeProcessTable {
    pub fn with(processes: &[(ProcessHandle, Behaviour)]) -> Arc<Self> {
        let table = Self::default();
        {
            let mut map = table.processes.lock().unwrap();
            for (handle, behaviour) in processes {
                map.insert(handle.pid, (handle.clone(), *behaviour));
            }
        }
        Arc::new(table)
    }

    pub fn spawn(&self, handle: ProcessHandle, behaviour: Behaviour) {
        self.processes
            .lock()
            .unwrap()
            .insert(handle.pid, (handle, behaviour));
    }

    pub fn remove_all(&self) {
        self.processes.lock().unwrap().clear();
    }

    pub fn signals_sent(&self) -> Vec<(u32, StopSignal)> {
        self.signals.lock().unwrap().clone()
    }

    pub fn callers(&self) -> Vec<std::thread::ThreadId> {
        self.callers.lock().unwrap().clone()
    }

    fn record_caller(&self) {
        self.callers.lock().unwrap().push(std::thread::current().id());
    }
}

impl ProcessTable for FakeProcessTable {
    fn snapshot(&self) -> Vec<ProcessHandle> {
        self.processes
            .lock()
            .unwrap()
            .values()
            .map(|(h, _)| h.clone())
            .collect()
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.record_caller();
        self.processes.lock().unwrap().contains_key(&pid)
    }

    fn send(&self, pid: u32, signal: StopSignal) -> crate::Result<()> {
        self.record_caller();
        self.signals.lock().unwrap().push((pid, signal));
        let mut processes = self.processes.lock().unwrap();
        let exits = match processes.get(&pid) {
            Some((_, b)) => match signal {
                StopSignal::Terminate => b.honors_term,
                StopSignal::Kill => b.honors_kill,
            },
            None => false,
        };
        if exits {
            processes.remove(&pid);
        }
        Ok(())
    }
}

/// Scripted shell that records calls and optionally mutates the fake table.
pub(crate) struct FakeShell {
    pub table: Arc<FakeProcessTable>,
    pub quit_accepted: bool,
    pub quit_stops_app: bool,
    pub uri_works: bool,
    pub launch_works: bool,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeShell {
    pub fn new(table: Arc<FakeProcessTable>) -> Self {
        Self {
            table,
            quit_accepted: false,
            quit_stops_app: false,
            uri_works: true,
            launch_works: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppShell for FakeShell {
    async fn request_quit(&self) -> bool {
        self.calls.lock().unwrap().push("quit");
        if self.quit_stops_app {
            self.table.remove_all();
        }
        self.quit_accepted
    }

    async fn open_uri(&self, _uri: &str) -> bool {
        self.calls.lock().unwrap().push("uri");
        if self.uri_works {
            self.table.spawn(app(500), COOPERATIVE);
        }
        self.uri_works
    }

    async fn launch_direct(&self) -> crate::Result<LaunchPlan> {
        self.calls.lock().unwrap().push("launch");
        if !self.launch_works {
            return Err(ProcessError::executable_not_found("antigravity", Vec::new()));
        }
        self.table.spawn(app(600), COOPERATIVE);
        Ok(LaunchPlan::PathCommand(String::from("antigravity")))
    }
}

pub(crate) fn app(pid: u32) -> ProcessHandle {
    ProcessHandle::new(
        pid,
        "antigravity",
        Some(PathBuf::from("/usr/share/antigravity/antigravity")),
    )
}

pub(crate) fn other(pid: u32, name: &str) -> ProcessHandle {
    ProcessHandle::new(pid, name, Some(PathBuf::from(format!("/usr/bin/{name}"))))
}

pub(crate) fn fast_policy(force_kill: bool) -> StopPolicy {
    StopPolicy {
        graceful_settle: Duration::from_millis(20),
        term_timeout: Duration::from_millis(60),
        poll_interval: Duration::from_millis(5),
        kill_settle: Duration::from_millis(20),
        force_kill,
    }
}

pub(crate) fn controller(
    table: Arc<FakeProcessTable>,
    shell: Arc<FakeShell>,
    policy: StopPolicy,
) -> ProcessController {
    ProcessController::new(
        table,
        shell,
        CandidateFilter::new(
            Box::new(LinuxMatcher::new("Antigravity")),
            ExclusionRules::new(OWN_PID, Some(PathBuf::from("/opt/agsw"))),
            None,
        ),
        policy,
        StartPolicy {
            use_uri: true,
            uri: String::from("antigravity://oauth-success"),
        },
    )
}
