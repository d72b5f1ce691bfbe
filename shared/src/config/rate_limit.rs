//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// A single named rate-limit rule
///
/// Rules are matched first-match-wins against the request path; requests
/// that match no rule fall back to the global limit and window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitRule {
    /// Rule name, used as part of the counter partition key
    pub name: String,

    /// Request path this rule applies to (compared case-insensitively)
    pub path: String,

    /// Maximum number of permitted requests per window
    pub limit: u32,

    /// Window duration in seconds
    pub window_secs: u64,
}

/// Rate limiting configuration
///
/// Immutable at runtime; loaded once at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Global fallback permit limit for paths with no matching rule
    pub global_limit: u32,

    /// Global fallback window duration in seconds
    pub global_window_secs: u64,

    /// Named per-path rules, checked in order
    #[serde(default)]
    pub rules: Vec<RateLimitRule>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            global_limit: 60,
            global_window_secs: 60,
            rules: Vec::new(),
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    ///
    /// Rules are parsed from `RATE_LIMIT_RULES` as a semicolon-separated
    /// list of `name:path:limit:window_secs` entries, e.g.
    /// `auth-strict:/api/auth/login:5:60;refresh:/api/v1/auth/refresh:10:60`.
    /// Malformed entries are skipped.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let rules = std::env::var("RATE_LIMIT_RULES")
            .map(|raw| parse_rules(&raw))
            .unwrap_or_default();

        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enabled),
            global_limit: std::env::var("RATE_LIMIT_GLOBAL_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.global_limit),
            global_window_secs: std::env::var("RATE_LIMIT_GLOBAL_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.global_window_secs),
            rules,
        }
    }

    /// Add a rule, preserving declaration order
    pub fn with_rule(mut self, rule: RateLimitRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Find the first rule whose path equals the request path
    /// (case-insensitive). `None` means the global fallback applies.
    pub fn match_rule(&self, path: &str) -> Option<&RateLimitRule> {
        self.rules
            .iter()
            .find(|rule| rule.path.eq_ignore_ascii_case(path))
    }
}

fn parse_rules(raw: &str) -> Vec<RateLimitRule> {
    raw.split(';')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.splitn(4, ':').collect();
            if parts.len() != 4 {
                return None;
            }
            Some(RateLimitRule {
                name: parts[0].trim().to_string(),
                path: parts[1].trim().to_string(),
                limit: parts[2].trim().parse().ok()?,
                window_secs: parts[3].trim().parse().ok()?,
            })
        })
        .filter(|rule| !rule.name.is_empty() && rule.limit >= 1 && rule.window_secs >= 1)
        .collect()
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.global_limit, 60);
        assert_eq!(config.global_window_secs, 60);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_match_rule_first_match_wins() {
        let config = RateLimitConfig::default()
            .with_rule(RateLimitRule {
                name: "first".to_string(),
                path: "/api/auth/login".to_string(),
                limit: 5,
                window_secs: 60,
            })
            .with_rule(RateLimitRule {
                name: "second".to_string(),
                path: "/api/auth/login".to_string(),
                limit: 100,
                window_secs: 60,
            });

        let matched = config.match_rule("/api/auth/login").unwrap();
        assert_eq!(matched.name, "first");
    }

    #[test]
    fn test_match_rule_case_insensitive() {
        let config = RateLimitConfig::default().with_rule(RateLimitRule {
            name: "login".to_string(),
            path: "/api/auth/login".to_string(),
            limit: 5,
            window_secs: 60,
        });

        assert!(config.match_rule("/API/Auth/Login").is_some());
        assert!(config.match_rule("/api/other").is_none());
    }

    #[test]
    fn test_parse_rules_from_string() {
        let rules = parse_rules("auth-strict:/api/auth/login:5:60;bad-entry;r2:/x:10:30");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "auth-strict");
        assert_eq!(rules[0].limit, 5);
        assert_eq!(rules[1].path, "/x");
        assert_eq!(rules[1].window_secs, 30);
    }

    #[test]
    fn test_parse_rules_rejects_zero_limit() {
        let rules = parse_rules("zero:/api:0:60");
        assert!(rules.is_empty());
    }
}
