// ABOUTME: Configuration loading and validation for the roster server.
// ABOUTME: Reads environment variables, applies command-line overrides, and refuses unsafe binds.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ROSTER_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("bind address {0} is not loopback and ROSTER_ALLOW_REMOTE is not set; refusing to expose the API")]
    RemoteBindNotAllowed(SocketAddr),
}

/// Values supplied on the command line. Any field that is set wins over the
/// matching environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub bind: Option<String>,
    pub allow_remote: bool,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub allow_remote: bool,
}

impl RosterConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - ROSTER_DB_PATH: SQLite database file (default: employees.db)
    /// - ROSTER_BIND: socket address to bind (default: 127.0.0.1:5000)
    /// - ROSTER_ALLOW_REMOTE: allow binding a non-loopback address (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(ConfigOverrides::default())
    }

    /// Load configuration from the environment, then apply overrides.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let db_path = overrides.db_path.unwrap_or_else(|| {
            std::env::var("ROSTER_DB_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("employees.db"))
        });

        let bind_str = overrides.bind.unwrap_or_else(|| {
            std::env::var("ROSTER_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_string())
        });
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let allow_remote = overrides.allow_remote
            || std::env::var("ROSTER_ALLOW_REMOTE")
                .map(|v| v == "true" || v == "1" || v == "yes")
                .unwrap_or(false);

        if !allow_remote && !bind.ip().is_loopback() {
            return Err(ConfigError::RemoteBindNotAllowed(bind));
        }

        Ok(Self {
            db_path,
            bind,
            allow_remote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_loads_defaults() {
        // SAFETY: test-only code, single-threaded test execution
        unsafe {
            std::env::remove_var("ROSTER_DB_PATH");
            std::env::remove_var("ROSTER_BIND");
            std::env::remove_var("ROSTER_ALLOW_REMOTE");
        }

        let config = RosterConfig::from_env().unwrap();

        assert_eq!(config.bind, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, PathBuf::from("employees.db"));
        assert!(!config.allow_remote);
    }

    #[test]
    fn config_overrides_win() {
        let config = RosterConfig::load(ConfigOverrides {
            db_path: Some(PathBuf::from("/var/lib/roster/staff.db")),
            bind: Some("127.0.0.1:8080".to_string()),
            allow_remote: false,
        })
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/roster/staff.db"));
        assert_eq!(config.bind.port(), 8080);
    }

    #[test]
    fn config_rejects_invalid_bind() {
        let err = RosterConfig::load(ConfigOverrides {
            bind: Some("not-an-address".to_string()),
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidBind(ref s) if s == "not-an-address"));
    }

    #[test]
    fn config_rejects_remote_bind_without_opt_in() {
        // SAFETY: test-only code, single-threaded test execution
        unsafe {
            std::env::remove_var("ROSTER_ALLOW_REMOTE");
        }

        let result = RosterConfig::load(ConfigOverrides {
            bind: Some("0.0.0.0:5000".to_string()),
            ..Default::default()
        });

        let err = result.unwrap_err();
        assert!(
            err.to_string().contains("ROSTER_ALLOW_REMOTE"),
            "error should mention the opt-in variable: {}",
            err
        );
    }

    #[test]
    fn config_allows_remote_bind_with_opt_in() {
        let config = RosterConfig::load(ConfigOverrides {
            bind: Some("0.0.0.0:5000".to_string()),
            allow_remote: true,
            ..Default::default()
        })
        .unwrap();

        assert!(config.allow_remote);
        assert!(config.bind.ip().is_unspecified());
    }
}
