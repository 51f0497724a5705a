//! Server configuration, populated from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

/// Runtime configuration for a tessel server.
///
/// Every field has a default, so the server starts with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `TESSEL_BIND` | `0.0.0.0:3000` | TCP socket address to listen on |
/// | `TESSEL_BODY_LIMIT` | `1048576` | Largest accepted request body, in bytes |
/// | `TESSEL_INHERIT_RULES` | `true` | Collections inherit their item resource's validation rules |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Request bodies larger than this are rejected before parsing.
    pub body_limit: usize,

    /// Whether a collection picks up the validation rules and restrictions
    /// registered for the resource it collects.
    pub inherit_rules: bool,
}

/// An environment variable that is set but unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TESSEL_BIND must be a socket address such as 0.0.0.0:3000, got {0:?}")]
    InvalidBind(String),

    #[error("TESSEL_BODY_LIMIT must be a byte count, got {0:?}")]
    InvalidBodyLimit(String),

    #[error("{var} must be true or false, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            body_limit: 1024 * 1024,
            inherit_rules: true,
        }
    }
}

impl ServerConfig {
    /// Populate config from the process environment, applying defaults
    /// where a variable is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("TESSEL_BIND") {
            config.bind_addr = raw.parse().map_err(|_| ConfigError::InvalidBind(raw))?;
        }

        if let Some(raw) = lookup("TESSEL_BODY_LIMIT") {
            config.body_limit = raw
                .parse()
                .map_err(|_| ConfigError::InvalidBodyLimit(raw))?;
        }

        if let Some(raw) = lookup("TESSEL_INHERIT_RULES") {
            config.inherit_rules = parse_flag("TESSEL_INHERIT_RULES", raw)?;
        }

        Ok(config)
    }
}

fn parse_flag(var: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { var, value: raw }),
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[])).unwrap(),
            ServerConfig::default()
        );
    }

    #[test]
    fn variables_override_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TESSEL_BIND", "127.0.0.1:8080"),
            ("TESSEL_BODY_LIMIT", "512"),
            ("TESSEL_INHERIT_RULES", "off"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.body_limit, 512);
        assert!(!config.inherit_rules);
    }

    #[test]
    fn bad_values_are_errors() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("TESSEL_BIND", "nowhere")])),
            Err(ConfigError::InvalidBind("nowhere".into()))
        );
        assert!(ServerConfig::from_lookup(lookup(&[("TESSEL_BODY_LIMIT", "-1")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("TESSEL_INHERIT_RULES", "maybe")])).is_err());
    }
}
