use super::{record, used_minutes_ago};
use crate::{Registry, RegistryFile, SwitchError};

use googletest::prelude::*;
use tempfile::TempDir;

#[test]
fn given_missing_file_when_loading_then_registry_is_empty() {
    // Given
    let temp = TempDir::new().unwrap();
    let file = RegistryFile::new(temp.path().join("accounts.json"));

    // When
    let registry = file.load().unwrap();

    // Then
    assert_that!(registry.is_empty(), eq(true));
}

#[test]
fn given_saved_registry_when_loading_then_records_survive() {
    // Given
    let temp = TempDir::new().unwrap();
    let file = RegistryFile::new(temp.path().join("accounts.json"));
    let alice = record("alice", "alice@example.com", temp.path());
    let mut registry = Registry::default();
    registry.upsert(alice.clone());

    // When
    file.save(&registry).unwrap();
    let loaded = file.load().unwrap();

    // Then
    assert_that!(loaded.len(), eq(1));
    assert_that!(loaded.get(&alice.id), some(eq(&alice)));
}

#[test]
fn given_unparsable_file_when_loading_then_corrupt_and_file_untouched() {
    // Given
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("accounts.json");
    std::fs::write(&path, "{ not json").unwrap();
    let file = RegistryFile::new(&path);

    // When
    let result = file.load();

    // Then
    assert!(matches!(result, Err(SwitchError::RegistryCorrupt { .. })));
    assert_that!(std::fs::read_to_string(&path).unwrap(), eq("{ not json"));
}

#[test]
fn given_key_not_matching_record_id_when_loading_then_corrupt() {
    // Given
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("accounts.json");
    let alice = record("alice", "alice@example.com", temp.path());
    let mut map = std::collections::BTreeMap::new();
    map.insert(uuid::Uuid::new_v4(), alice);
    std::fs::write(&path, serde_json::to_string(&map).unwrap()).unwrap();

    // When
    let result = RegistryFile::new(&path).load();

    // Then
    assert!(matches!(result, Err(SwitchError::RegistryCorrupt { .. })));
}

#[test]
fn given_mixed_case_email_when_finding_then_match_is_case_sensitive() {
    // Given
    let temp = TempDir::new().unwrap();
    let alice = record("alice", "Alice@Example.com", temp.path());
    let mut registry = Registry::default();
    registry.upsert(alice.clone());

    // When
    let other_case = registry.find_by_email("alice@example.com");
    let exact = registry.find_by_email("Alice@Example.com");

    // Then
    assert!(other_case.is_none());
    assert_that!(exact.map(|r| r.id), some(eq(alice.id)));
}

#[test]
fn given_unknown_records_when_finding_unknown_then_nothing_matches() {
    // Given
    let temp = TempDir::new().unwrap();
    let mut registry = Registry::default();
    registry.upsert(record("Account_1", "Unknown", temp.path()));

    // When
    let found = registry.find_by_email("Unknown");

    // Then
    assert_that!(found.is_none(), eq(true));
}

#[test]
fn given_usage_history_when_sorting_then_most_recent_first_and_unused_last() {
    // Given
    let temp = TempDir::new().unwrap();
    let old = used_minutes_ago(record("old", "old@example.com", temp.path()), 60);
    let recent = used_minutes_ago(record("recent", "recent@example.com", temp.path()), 1);
    let unused = record("unused", "unused@example.com", temp.path());
    let mut registry = Registry::default();
    for r in [old.clone(), unused.clone(), recent.clone()] {
        registry.upsert(r);
    }

    // When
    let sorted: Vec<String> = registry
        .sorted_by_last_used()
        .into_iter()
        .map(|r| r.display_name)
        .collect();

    // Then
    assert_that!(sorted, elements_are![eq("recent"), eq("old"), eq("unused")]);
}
