//! Layered configuration: embedded defaults, optional local file, environment.

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Timing of a mentoring session and of each agent step inside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub max_wait_seconds: u64,
    pub poll_interval_ms: u64,
    pub agent_timeout_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_wait_seconds: 120,
            poll_interval_ms: 1_000,
            agent_timeout_seconds: 30,
        }
    }
}

/// Where per-student records and reports are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("student_reports"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_per_minute: u32,
    pub max_request_size_kb: usize,
    pub enable_security_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_rate_limiting: true,
            rate_limit_per_minute: 120,
            max_request_size_kb: 64,
            enable_security_headers: true,
        }
    }
}

/// Main settings structure with all configuration sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

impl Settings {
    /// Load settings from the embedded defaults, an optional `mentor.*` file
    /// in the working directory, and `MENTOR__*` environment variables.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(include_str!("../config.toml"), FileFormat::Toml))
            .add_source(File::with_name("mentor").required(false))
            .add_source(
                Environment::with_prefix("MENTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to assemble configuration sources")?;

        let mut settings: Settings = config
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        Self::apply_env_overrides(&mut settings)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Load from an explicit file layered over the embedded defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(include_str!("../config.toml"), FileFormat::Toml))
            .add_source(File::from(path))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let mut settings: Settings = config
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        Self::apply_env_overrides(&mut settings)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Short-form overrides that take precedence over everything else
    fn apply_env_overrides(settings: &mut Settings) -> Result<()> {
        if let Ok(host) = std::env::var("MENTOR_SERVER_HOST") {
            settings.server.host = host;
        }
        if let Ok(port) = std::env::var("MENTOR_SERVER_PORT") {
            settings.server.port = port
                .parse()
                .with_context(|| format!("MENTOR_SERVER_PORT is not a valid port: {port}"))?;
        }
        if let Ok(dir) = std::env::var("MENTOR_STORAGE_DIR") {
            settings.storage.base_dir = PathBuf::from(dir);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port cannot be 0"));
        }

        if self.session.poll_interval_ms == 0 {
            return Err(anyhow!("Session poll interval cannot be 0"));
        }
        if self.session.poll_interval_ms > self.session.max_wait_seconds.saturating_mul(1_000) {
            return Err(anyhow!(
                "Session poll interval ({}ms) exceeds the maximum wait ({}s)",
                self.session.poll_interval_ms,
                self.session.max_wait_seconds
            ));
        }
        if self.session.agent_timeout_seconds > self.session.max_wait_seconds {
            warn!(
                "Agent timeout ({}s) is longer than the session wait ({}s)",
                self.session.agent_timeout_seconds, self.session.max_wait_seconds
            );
        }

        if self.security.enable_rate_limiting && self.security.rate_limit_per_minute == 0 {
            return Err(anyhow!("Rate limiting enabled with a limit of 0 requests per minute"));
        }

        if self.storage.base_dir.as_os_str().is_empty() {
            return Err(anyhow!("Storage base directory cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.session.max_wait_seconds, 120);
        assert_eq!(settings.session.poll_interval_ms, 1_000);
        assert_eq!(settings.storage.base_dir, PathBuf::from("student_reports"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.session.poll_interval_ms = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.session.max_wait_seconds = 1;
        settings.session.poll_interval_ms = 5_000;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.security.rate_limit_per_minute = 0;
        assert!(settings.validate().is_err());
        settings.security.enable_rate_limiting = false;
        assert!(settings.validate().is_ok());

        let mut settings = Settings::default();
        settings.storage.base_dir = PathBuf::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_file_layers_over_embedded_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[session]\nmax_wait_seconds = 10\npoll_interval_ms = 250").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.session.max_wait_seconds, 10);
        assert_eq!(settings.session.poll_interval_ms, 250);
        // Untouched sections keep their embedded values.
        assert_eq!(settings.session.agent_timeout_seconds, 30);
        assert_eq!(settings.logging.level, "info");
    }
}
