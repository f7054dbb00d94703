//! Server configuration from environment variables.

use recipe_core::ai::ConfigError;
use recipe_core::publish::RetryPolicy;
use std::env;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Inject a fixed identity when the platform's auth headers are absent.
    pub local_dev: bool,
    /// Run the relevance judge before description and voice generation.
    pub judge_enabled: bool,
    /// Retry policy for copying template files into a new site.
    pub bootstrap_retry: RetryPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DB_URL`: Postgres connection URL
    ///
    /// Optional:
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:8080")
    /// - `LOCAL_DEV`: "true" to inject mock identity headers
    /// - `JUDGE_ENABLED`: "false" to skip the relevance judge (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DB_URL").map_err(|_| ConfigError::MissingEnvVar("DB_URL".to_string()))?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let local_dev = parse_flag("LOCAL_DEV", env::var("LOCAL_DEV").ok(), false)?;
        let judge_enabled = parse_flag("JUDGE_ENABLED", env::var("JUDGE_ENABLED").ok(), true)?;

        Ok(Self {
            database_url,
            bind_addr,
            local_dev,
            judge_enabled,
            bootstrap_retry: RetryPolicy::default(),
        })
    }
}

fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref() {
        None | Some("") => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", None, true).unwrap());
        assert!(!parse_flag("X", None, false).unwrap());
        assert!(parse_flag("X", Some("1".to_string()), false).unwrap());
        assert!(!parse_flag("X", Some("false".to_string()), true).unwrap());
        assert!(parse_flag("X", Some("yes".to_string()), true).is_err());
    }
}
