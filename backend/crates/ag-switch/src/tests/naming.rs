use crate::default_name;

use chrono::{TimeZone, Utc};
use googletest::prelude::*;

#[test]
fn given_email_when_deriving_name_then_local_part_is_used() {
    let now = Utc::now();
    assert_that!(default_name("alice@example.com", now), eq("alice"));
}

#[test]
fn given_unknown_email_when_deriving_name_then_timestamp_name() {
    // Given
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    // When
    let name = default_name("Unknown", now);

    // Then
    assert_that!(name, eq(&format!("Account_{}", now.timestamp())));
}

#[test]
fn given_value_without_at_sign_when_deriving_name_then_timestamp_name() {
    let now = Utc::now();
    assert_that!(default_name("nobody", now), starts_with("Account_"));
}
