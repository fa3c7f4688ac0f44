//! Environment Lookups
//!
//! Helpers for reading configuration through a lookup function, so config
//! loaders can be tested without touching the process environment.

use crate::error::{BotError, Result};

/// Key → value lookup, usually `|k| std::env::var(k).ok()`
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Lookup backed by the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// A value that must be present and non-empty
pub fn required(lookup: Lookup<'_>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| BotError::Config(format!("{key} not set")))
}

/// A value with a fallback
pub fn optional(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// A positive number of seconds with a fallback
pub fn seconds(lookup: Lookup<'_>, key: &str, default: u64) -> Result<u64> {
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(BotError::Config(format!("{key} must be greater than zero"))),
        Ok(secs) => Ok(secs),
        Err(e) => Err(BotError::Config(format!("{key}='{raw}' is not a number of seconds: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_required() {
        let env = vars(&[("A", "1"), ("EMPTY", " ")]);
        let lookup = |k: &str| env.get(k).cloned();

        assert_eq!(required(&lookup, "A").unwrap(), "1");
        assert!(matches!(required(&lookup, "EMPTY"), Err(BotError::Config(_))));
        assert!(matches!(required(&lookup, "MISSING"), Err(BotError::Config(_))));
    }

    #[test]
    fn test_seconds() {
        let env = vars(&[("OK", "60"), ("ZERO", "0"), ("BAD", "1m")]);
        let lookup = |k: &str| env.get(k).cloned();

        assert_eq!(seconds(&lookup, "OK", 15).unwrap(), 60);
        assert_eq!(seconds(&lookup, "MISSING", 15).unwrap(), 15);
        assert!(seconds(&lookup, "ZERO", 15).is_err());
        assert!(seconds(&lookup, "BAD", 15).is_err());
    }

    #[test]
    fn test_optional() {
        let env = vars(&[("NAME", "CryptMoney")]);
        let lookup = |k: &str| env.get(k).cloned();

        assert_eq!(optional(&lookup, "NAME", "bot"), "CryptMoney");
        assert_eq!(optional(&lookup, "OTHER", "bot"), "bot");
    }
}
