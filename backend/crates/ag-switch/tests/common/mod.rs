#![allow(dead_code)]

use ag_core::ProcessHandle;
use ag_process::{
    AppShell, CandidateFilter, ExclusionRules, LaunchPlan, LinuxMatcher, ProcessController,
    ProcessError, ProcessTable, StartPolicy, StopPolicy, StopSignal,
};
use ag_store::{StoreAccessor, StoreLocations, backup_sibling};
use ag_switch::{IdentitySwitcher, SwitcherPaths};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use tempfile::TempDir;

pub const AUTH_KEY: &str = "antigravityAuthStatus";
pub const INIT_KEY: &str = "jetskiStateSync.agentManagerInitState";
pub const SETTINGS_KEY: &str = "antigravityUserSettings.allUserSettings";

// ============================================================================
// Fake process layer
// ============================================================================

/// Process list where `Terminate` ends every process unless it is stubborn.
#[derive(Default)]
pub struct FakeTable {
    processes: Mutex<BTreeMap<u32, ProcessHandle>>,
    stubborn: Mutex<bool>,
    signals: Mutex<Vec<(u32, StopSignal)>>,
}

impl FakeTable {
    pub fn spawn(&self, pid: u32) {
        self.processes.lock().unwrap().insert(pid, app(pid));
    }

    pub fn make_unkillable(&self) {
        *self.stubborn.lock().unwrap() = true;
    }

    pub fn signals_sent(&self) -> Vec<(u32, StopSignal)> {
        self.signals.lock().unwrap().clone()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.processes.lock().unwrap().keys().copied().collect()
    }
}

impl ProcessTable for FakeTable {
    fn snapshot(&self) -> Vec<ProcessHandle> {
        self.processes.lock().unwrap().values().cloned().collect()
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.processes.lock().unwrap().contains_key(&pid)
    }

    fn send(&self, pid: u32, signal: StopSignal) -> ag_process::Result<()> {
        self.signals.lock().unwrap().push((pid, signal));
        if !*self.stubborn.lock().unwrap() {
            self.processes.lock().unwrap().remove(&pid);
        }
        Ok(())
    }
}

/// Shell that refuses polite quits and launches into the fake table.
pub struct FakeShell {
    table: Arc<FakeTable>,
    launch_works: Mutex<bool>,
    launches: Mutex<usize>,
}

impl FakeShell {
    pub fn new(table: Arc<FakeTable>) -> Self {
        Self {
            table,
            launch_works: Mutex::new(true),
            launches: Mutex::new(0),
        }
    }

    pub fn break_launch(&self) {
        *self.launch_works.lock().unwrap() = false;
    }

    pub fn launches(&self) -> usize {
        *self.launches.lock().unwrap()
    }
}

#[async_trait]
impl AppShell for FakeShell {
    async fn request_quit(&self) -> bool {
        false
    }

    async fn open_uri(&self, _uri: &str) -> bool {
        false
    }

    async fn launch_direct(&self) -> ag_process::Result<LaunchPlan> {
        *self.launches.lock().unwrap() += 1;
        if !*self.launch_works.lock().unwrap() {
            return Err(ProcessError::executable_not_found("antigravity", Vec::new()));
        }
        self.table.spawn(600);
        Ok(LaunchPlan::PathCommand(String::from("antigravity")))
    }
}

pub fn app(pid: u32) -> ProcessHandle {
    ProcessHandle::new(
        pid,
        "antigravity",
        Some(PathBuf::from("/usr/share/antigravity/antigravity")),
    )
}

// ============================================================================
// Store helpers
// ============================================================================

pub async fn connect(path: &Path, create: bool) -> SqliteConnection {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .connect()
        .await
        .expect("Failed to open test store")
}

/// Creates (or overwrites rows of) a store file shaped like the application's
pub async fn put_rows(path: &Path, rows: &[(&str, &str)]) {
    let mut conn = connect(path, true).await;

    sqlx::query("CREATE TABLE IF NOT EXISTS ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)")
        .execute(&mut conn)
        .await
        .expect("Failed to create ItemTable");

    for (key, value) in rows {
        sqlx::query("INSERT OR REPLACE INTO ItemTable (key, value) VALUES (?, ?)")
            .bind(*key)
            .bind(*value)
            .execute(&mut conn)
            .await
            .expect("Failed to seed row");
    }

    conn.close().await.expect("Failed to close store");
}

pub async fn dump_store(path: &Path) -> BTreeMap<String, String> {
    let mut conn = connect(path, false).await;

    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, CAST(value AS TEXT) FROM ItemTable")
            .fetch_all(&mut conn)
            .await
            .expect("Failed to dump store");

    conn.close().await.expect("Failed to close store");
    rows.into_iter().collect()
}

pub fn auth_value(email: &str) -> String {
    format!(r#"{{"email":"{email}","token":"token-of-{email}"}}"#)
}

/// Simulates the user signing in to the application
pub async fn sign_in(store: &Path, email: &str) {
    put_rows(
        store,
        &[
            (AUTH_KEY, &auth_value(email)),
            (INIT_KEY, &format!("init-of-{email}")),
            (SETTINGS_KEY, "{}"),
        ],
    )
    .await;
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub temp: TempDir,
    pub store: PathBuf,
    pub data_dir: PathBuf,
    pub table: Arc<FakeTable>,
    pub shell: Arc<FakeShell>,
    pub switcher: IdentitySwitcher,
}

impl Harness {
    /// Switcher over a fresh store, with the application running as pid 100.
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Same as [`Harness::new`] plus a `.backup` sibling store.
    pub async fn with_backup_store() -> Self {
        Self::build(true).await
    }

    async fn build(with_backup: bool) -> Self {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("app").join("state.vscdb");
        std::fs::create_dir_all(store.parent().unwrap()).unwrap();
        put_rows(&store, &[]).await;
        if with_backup {
            put_rows(&backup_sibling(&store), &[]).await;
        }

        let data_dir = temp.path().join("data");

        let table = Arc::new(FakeTable::default());
        table.spawn(100);
        let shell = Arc::new(FakeShell::new(Arc::clone(&table)));

        let switcher = switcher_over(&data_dir, &store, &table, &shell);

        Self {
            temp,
            store,
            data_dir,
            table,
            shell,
            switcher,
        }
    }

    /// Second switcher sharing the store and fakes, reaching the data through `data_dir`.
    pub fn switcher_at(&self, data_dir: &Path) -> IdentitySwitcher {
        switcher_over(data_dir, &self.store, &self.table, &self.shell)
    }
}

fn switcher_over(
    data_dir: &Path,
    store: &Path,
    table: &Arc<FakeTable>,
    shell: &Arc<FakeShell>,
) -> IdentitySwitcher {
    let paths = SwitcherPaths {
        data_dir: data_dir.to_path_buf(),
        registry: data_dir.join("antigravity_accounts.json"),
        backups_dir: data_dir.join("backups"),
    };

    let controller = ProcessController::new(
        table.clone(),
        shell.clone(),
        CandidateFilter::new(
            Box::new(LinuxMatcher::new("Antigravity")),
            ExclusionRules::new(1, None),
            None,
        ),
        StopPolicy {
            graceful_settle: Duration::from_millis(20),
            term_timeout: Duration::from_millis(60),
            poll_interval: Duration::from_millis(5),
            kill_settle: Duration::from_millis(20),
            force_kill: true,
        },
        StartPolicy {
            use_uri: false,
            uri: String::from("antigravity://oauth-success"),
        },
    );

    IdentitySwitcher::new(
        paths,
        StoreLocations::new(vec![store.to_path_buf()]),
        StoreAccessor::new(Duration::from_millis(100)),
        Arc::new(controller),
    )
}
