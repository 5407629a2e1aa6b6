use std::str::FromStr;

/// Error raised when the environment holds an unusable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    /// Synchronous AIGC calls must time out before the HTTP request does.
    #[error(
        "AIGC_TIMEOUT_SECS ({aigc_secs}) must be less than REQUEST_TIMEOUT_SECS ({request_secs})"
    )]
    AigcTimeoutExceedsRequest { aigc_secs: u64, request_secs: u64 },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `150`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight generation jobs (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. Jobs are kept in memory when unset.
    pub database_url: Option<String>,
    pub aigc: AigcConfig,
}

/// Settings for the remote AIGC compute service.
#[derive(Debug, Clone)]
pub struct AigcConfig {
    /// Base URL of the service (default: `http://localhost:8888`).
    pub endpoint: String,
    /// Transport timeout for synchronous calls in seconds (default: `120`).
    /// Must be less than the HTTP request timeout.
    pub request_timeout_secs: u64,
    /// Budget for one background generation job in seconds (default: `300`).
    /// The only limit on a generation call.
    pub job_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `150`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`          | unset (in-memory jobs)     |
    /// | `AIGC_ENDPOINT`         | `http://localhost:8888`    |
    /// | `AIGC_TIMEOUT_SECS`     | `120`                      |
    /// | `AIGC_JOB_TIMEOUT_SECS` | `300`                      |
    ///
    /// `AIGC_TIMEOUT_SECS` must be less than `REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cors_origins = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let config = Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", var("PORT", "3000"), "u16")?,
            cors_origins,
            request_timeout_secs: parse(
                "REQUEST_TIMEOUT_SECS",
                var("REQUEST_TIMEOUT_SECS", "150"),
                "u64",
            )?,
            shutdown_timeout_secs: parse(
                "SHUTDOWN_TIMEOUT_SECS",
                var("SHUTDOWN_TIMEOUT_SECS", "30"),
                "u64",
            )?,
            database_url,
            aigc: AigcConfig {
                endpoint: var("AIGC_ENDPOINT", "http://localhost:8888"),
                request_timeout_secs: parse(
                    "AIGC_TIMEOUT_SECS",
                    var("AIGC_TIMEOUT_SECS", "120"),
                    "u64",
                )?,
                job_timeout_secs: parse(
                    "AIGC_JOB_TIMEOUT_SECS",
                    var("AIGC_JOB_TIMEOUT_SECS", "300"),
                    "u64",
                )?,
            },
        };

        if config.aigc.request_timeout_secs >= config.request_timeout_secs {
            return Err(ConfigError::AigcTimeoutExceedsRequest {
                aigc_secs: config.aigc.request_timeout_secs,
                request_secs: config.request_timeout_secs,
            });
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String, expected: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        expected,
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 150);
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert!(config.database_url.is_none());
        assert_eq!(config.aigc.endpoint, "http://localhost:8888");
        assert_eq!(config.aigc.request_timeout_secs, 120);
        assert_eq!(config.aigc.job_timeout_secs, 300);
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.test, https://b.test,,"),
            ("AIGC_ENDPOINT", "http://aigc.internal:9000"),
            ("AIGC_JOB_TIMEOUT_SECS", "60"),
            ("DATABASE_URL", "postgres://localhost/spx"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["https://a.test", "https://b.test"]);
        assert_eq!(config.aigc.endpoint, "http://aigc.internal:9000");
        assert_eq!(config.aigc.job_timeout_secs, 60);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/spx"));
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let config = load(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = load(&[("PORT", "http")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { key: "PORT", .. });
        assert_eq!(err.to_string(), "PORT must be a valid u16, got \"http\"");
    }

    #[test]
    fn aigc_timeout_must_fit_inside_request_timeout() {
        let err = load(&[("REQUEST_TIMEOUT_SECS", "30")]).unwrap_err();
        assert_matches!(
            err,
            ConfigError::AigcTimeoutExceedsRequest {
                aigc_secs: 120,
                request_secs: 30
            }
        );

        let err = load(&[("REQUEST_TIMEOUT_SECS", "60"), ("AIGC_TIMEOUT_SECS", "60")]).unwrap_err();
        assert_matches!(err, ConfigError::AigcTimeoutExceedsRequest { .. });

        let config = load(&[("REQUEST_TIMEOUT_SECS", "60"), ("AIGC_TIMEOUT_SECS", "45")]).unwrap();
        assert_eq!(config.aigc.request_timeout_secs, 45);
    }
}
