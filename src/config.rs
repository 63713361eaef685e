use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::blockchain::DIFF_MAX;

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub history_dir: String,
    pub max_difficulty: u32,
    /// Wall-clock bound on a single mining request; `None` means unbounded.
    pub mining_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            history_dir: "blockchain_history".to_string(),
            max_difficulty: DIFF_MAX,
            mining_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; unset or unparsable keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_secs: u64 = parse_or(&lookup, "MINING_TIMEOUT_SECS", 120);
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            history_dir: lookup("HISTORY_DIR").unwrap_or(defaults.history_dir),
            max_difficulty: parse_or(&lookup, "MAX_DIFFICULTY", defaults.max_difficulty),
            mining_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Settings::from_lookup(lookup(&[])), Settings::default());
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("HISTORY_DIR", "/tmp/h"),
            ("MAX_DIFFICULTY", "4"),
            ("MINING_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 9000);
        assert_eq!(s.history_dir, "/tmp/h");
        assert_eq!(s.max_difficulty, 4);
        assert_eq!(s.mining_timeout, None);
    }

    #[test]
    fn invalid_values_fall_back() {
        let s = Settings::from_lookup(lookup(&[("PORT", "http"), ("MINING_TIMEOUT_SECS", "-1")]));
        assert_eq!(s.port, 8080);
        assert_eq!(s.mining_timeout, Some(Duration::from_secs(120)));
    }
}
