//! Grammar checks for values that may reach a process boundary
//!
//! These allow-lists are the load-bearing control. A value that passes has a
//! shape that cannot carry shell syntax, whatever the denylist in
//! [`crate::guard`] thinks of it.

use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

use serde_json::{Number, Value};

use crate::types::GatewayError;

/// A TCP port in `1..=65535` that passed [`validate_port`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortValue(NonZeroU16);

impl PortValue {
    pub fn get(self) -> u16 {
        self.0.get()
    }

    /// The `lsof -i` filter for this port, e.g. `tcp:8080`
    pub fn tcp_filter(self) -> String {
        format!("tcp:{}", self.0)
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PortValue {
    type Err = GatewayError;

    /// Digits only: no sign, no whitespace, no decimal point
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let reject = || GatewayError::InvalidPort(format!("{:?}", raw));

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(reject());
        }

        let value: u32 = raw.parse().map_err(|_| reject())?;
        Self::from_u64(u64::from(value)).ok_or_else(reject)
    }
}

impl PortValue {
    fn from_u64(value: u64) -> Option<Self> {
        u16::try_from(value).ok().and_then(NonZeroU16::new).map(Self)
    }

    fn from_number(number: &Number) -> Option<Self> {
        if let Some(value) = number.as_u64() {
            return Self::from_u64(value);
        }

        // Integral floats such as 8080.0 are accepted, 8080.5 is not
        let value = number.as_f64()?;
        if value.fract() != 0.0 || !(1.0..=f64::from(u16::MAX)).contains(&value) {
            return None;
        }
        Self::from_u64(value as u64)
    }
}

/// Validate an externally supplied port of any JSON type
pub fn validate_port(raw: &Value) -> Result<PortValue, GatewayError> {
    match raw {
        Value::String(s) => s.parse(),
        Value::Number(n) => {
            PortValue::from_number(n).ok_or_else(|| GatewayError::InvalidPort(n.to_string()))
        }
        other => Err(GatewayError::InvalidPort(other.to_string())),
    }
}

/// A process id that matched `^[0-9]+$`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessId(String);

impl ProcessId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a PID read back from a child process before reusing it
pub fn validate_process_id(raw: &str) -> Result<ProcessId, GatewayError> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        Ok(ProcessId(raw.to_string()))
    } else {
        Err(GatewayError::InvalidProcessId(format!("{:?}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_port_range() {
        for port in [1u16, 22, 80, 443, 8080, 65535] {
            let parsed = validate_port(&json!(port.to_string())).unwrap();
            assert_eq!(parsed.get(), port);

            let parsed = validate_port(&json!(port)).unwrap();
            assert_eq!(parsed.get(), port);
        }
    }

    #[test]
    fn test_accepts_every_port_in_range() {
        for port in 1..=u16::MAX {
            assert!(validate_port(&json!(port.to_string())).is_ok(), "{}", port);
        }
    }

    #[test]
    fn test_rejects_out_of_range_and_malformed() {
        let rejected = [
            json!("0"),
            json!("-1"),
            json!("65536"),
            json!("99999"),
            json!("8080.5"),
            json!("8080.0"),
            json!(""),
            json!("abc"),
            json!("null"),
            json!("undefined"),
            json!(" 8080"),
            json!("8080 "),
            json!("+8080"),
            json!("0x1F90"),
            json!("1e3"),
            json!("99999999999999999999999"),
            json!(0),
            json!(-1),
            json!(65536),
            json!(8080.5),
            json!(-8080.0),
            json!(1e300),
            json!(null),
            json!(true),
            json!(["8080"]),
            json!({ "port": 8080 }),
        ];

        for raw in rejected {
            let err = validate_port(&raw).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidPort(_)), "{}", raw);
        }
    }

    #[test]
    fn test_integral_float_accepted() {
        assert_eq!(validate_port(&json!(8080.0)).unwrap().get(), 8080);
    }

    #[test]
    fn test_shell_metacharacters_never_parse() {
        let bodies = ["8080", "", "80", "65535", "touch /tmp/pwned", "1"];
        for c in [';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']'] {
            for body in bodies {
                for candidate in [
                    format!("{}{}", body, c),
                    format!("{}{}", c, body),
                    format!("{}{}{}", body, c, body),
                    format!("{}{} touch /tmp/pwned; #", body, c),
                ] {
                    assert!(
                        validate_port(&json!(candidate)).is_err(),
                        "accepted {:?}",
                        candidate
                    );
                }
            }
        }
    }

    #[test]
    fn test_tcp_filter_is_canonical() {
        let port = validate_port(&json!("08080")).unwrap();
        assert_eq!(port.tcp_filter(), "tcp:8080");
        assert_eq!(port.to_string(), "8080");
    }

    #[test]
    fn test_process_id_grammar() {
        assert_eq!(validate_process_id("4242").unwrap().as_str(), "4242");
        assert_eq!(validate_process_id("1").unwrap().into_string(), "1");

        for raw in [
            "123; rm -rf /",
            "",
            "12a",
            " 12",
            "12\n13",
            "-1",
            "$(id)",
            "١٢٣",
        ] {
            let err = validate_process_id(raw).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidProcessId(_)), "{:?}", raw);
        }
    }
}
