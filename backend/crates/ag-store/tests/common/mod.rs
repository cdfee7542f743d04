#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};

pub const AUTH_KEY: &str = "antigravityAuthStatus";
pub const INIT_KEY: &str = "jetskiStateSync.agentManagerInitState";

/// Creates a store file shaped like the application's, seeded with the given rows
pub async fn create_store(path: &Path, rows: &[(&str, &str)]) {
    let mut conn = connect(path, true).await;

    sqlx::query("CREATE TABLE IF NOT EXISTS ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)")
        .execute(&mut conn)
        .await
        .expect("Failed to create ItemTable");

    for (key, value) in rows {
        sqlx::query("INSERT INTO ItemTable (key, value) VALUES (?, ?)")
            .bind(*key)
            .bind(*value)
            .execute(&mut conn)
            .await
            .expect("Failed to seed row");
    }

    conn.close().await.expect("Failed to close store");
}

/// Reads every row back with a plain connection
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

pub async fn connect(path: &Path, create: bool) -> SqliteConnection {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .connect()
        .await
        .expect("Failed to open test store")
}

pub fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
