/// Store keys eligible for capture and restore.
///
/// Nothing outside this list is ever written to the foreign store.
pub const ALLOWED_KEYS: [&str; 2] = [
    "antigravityAuthStatus",
    "jetskiStateSync.agentManagerInitState",
];

/// Keys probed (read-only, in order) when looking for the signed-in email.
pub const EMAIL_PROBE_KEYS: [&str; 3] = [
    "antigravityAuthStatus",
    "google.antigravity",
    "antigravityUserSettings.allUserSettings",
];

pub fn is_allowed_key(key: &str) -> bool {
    ALLOWED_KEYS.contains(&key)
}
