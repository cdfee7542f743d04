use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir, write_config};

use googletest::assert_that;
use googletest::prelude::{anything, eq, ok};
use log::LevelFilter;
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _temp = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.process.term_timeout_secs, eq(10));
    assert_that!(config.process.poll_interval_ms, eq(500));
    assert_that!(config.process.force_kill, eq(true));
    assert_that!(config.target.app_name.as_str(), eq("Antigravity"));
    assert_that!(config.target.uri.as_str(), eq(crate::DEFAULT_URI));
    assert_that!(config.store.paths.is_empty(), eq(true));
    assert_that!(*config.logging.level, eq(LevelFilter::Info));
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_then_dir_is_created() {
    // Given
    let (temp, _guard) = setup_config_dir();
    let nested = temp.path().join("nested").join("agent");
    let _dir = EnvGuard::set(crate::CONFIG_DIR_ENV, nested.to_str().unwrap());

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    assert_that!(nested.is_dir(), eq(true));
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [process]
            term_timeout_secs = 20
            force_kill = false

            [target]
            app_name = "Antigravity Beta"
            launch_args = ["--disable-gpu"]

            [logging]
            level = "debug"
        "#,
    );

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.process.term_timeout_secs, eq(20));
    assert_that!(config.process.force_kill, eq(false));
    assert_that!(config.process.poll_interval_ms, eq(500));
    assert_that!(config.target.app_name.as_str(), eq("Antigravity Beta"));
    assert_that!(config.target.launch_args.len(), eq(1));
    assert_that!(*config.logging.level, eq(LevelFilter::Debug));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(&temp, "[process]\nterm_timeout_secs = 20");
    let _timeout = EnvGuard::set("AG_TERM_TIMEOUT_SECS", "5");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.process.term_timeout_secs, eq(5));
}

#[test]
#[serial]
fn given_multiple_env_overrides_when_load_then_all_apply() {
    // Given
    let _temp = setup_config_dir();
    let _force = EnvGuard::set("AG_FORCE_KILL", "0");
    let _uri = EnvGuard::set("AG_USE_URI", "false");
    let _exe = EnvGuard::set("AG_EXECUTABLE", "/opt/antigravity/antigravity");
    let _level = EnvGuard::set("AG_LOG_LEVEL", "warning");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.process.force_kill, eq(false));
    assert_that!(config.process.use_uri, eq(false));
    assert_that!(
        config.target.executable.as_deref(),
        eq(Some("/opt/antigravity/antigravity"))
    );
    assert_that!(*config.logging.level, eq(LevelFilter::Warn));
}

#[test]
#[serial]
fn given_store_paths_env_when_load_then_paths_are_split() {
    // Given
    let _temp = setup_config_dir();
    let joined = std::env::join_paths(["/a/state.vscdb", "/b/state.vscdb"]).unwrap();
    let _paths = EnvGuard::set("AG_STORE_PATHS", joined.to_str().unwrap());

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.store.paths.len(), eq(2));
    assert_that!(config.store.paths[1].as_str(), eq("/b/state.vscdb"));
}

#[test]
#[serial]
fn given_default_paths_when_resolving_then_files_live_under_config_dir() {
    // Given
    let (temp, _guard) = setup_config_dir();
    let _data = EnvGuard::remove("AG_DATA_DIR");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.data_dir().unwrap(), eq(&temp.path().to_path_buf()));
    assert_that!(
        config.accounts_path().unwrap(),
        eq(&temp.path().join("antigravity_accounts.json"))
    );
    assert_that!(config.backups_dir().unwrap(), eq(&temp.path().join("backups")));
    assert_that!(config.logs_dir().unwrap(), eq(&temp.path().join("logs")));
}

#[test]
#[serial]
fn given_data_dir_override_when_resolving_then_files_move_with_it() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let data = tempfile::TempDir::new().unwrap();
    let _data = EnvGuard::set("AG_DATA_DIR", data.path().to_str().unwrap());

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), ok(anything()));
    assert_that!(config.backups_dir().unwrap(), eq(&data.path().join("backups")));
}
