use ag_core::EMAIL_PROBE_KEYS;

use std::collections::BTreeMap;

use serde_json::Value;

/// Finds the signed-in email among probe-key values.
///
/// Keys are tried in `EMAIL_PROBE_KEYS` order. Each value must be a JSON object
/// with a string `email`; the first probe key also accepts any casing of `email`.
/// Malformed values are skipped.
pub fn email_from_entries(entries: &BTreeMap<String, String>) -> Option<String> {
    EMAIL_PROBE_KEYS
        .iter()
        .enumerate()
        .filter_map(|(index, key)| {
            let raw = entries.get(*key)?;
            email_from_value(raw, index == 0)
        })
        .next()
}

fn email_from_value(raw: &str, any_case: bool) -> Option<String> {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        return None;
    };

    if let Some(email) = map.get("email").and_then(Value::as_str) {
        return non_empty(email);
    }

    if any_case {
        return map
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case("email") && v.is_string())
            .and_then(|(_, v)| v.as_str())
            .and_then(non_empty);
    }

    None
}

fn non_empty(email: &str) -> Option<String> {
    let trimmed = email.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
