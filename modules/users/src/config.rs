use serde::{Deserialize, Serialize};

/// Configuration for the users module (`modules.users`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersConfig {
    /// HTTP status returned when an id matches no record. 404 by default;
    /// 500 reproduces the older "generic failure" behaviour.
    #[serde(default = "default_not_found_status")]
    pub not_found_status: u16,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            not_found_status: default_not_found_status(),
        }
    }
}

fn default_not_found_status() -> u16 {
    404
}
