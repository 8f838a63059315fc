use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::policy::RemotePolicy;
use crate::domain::user::{Role, User, UserId};
use crate::policy::PolicySet;
use crate::store::UserDirectory;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Directory and policy rows loaded once at startup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub policies: Vec<SeedPolicy>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub role: Role,
    pub department: String,
    pub manager_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedPolicy {
    pub department: String,
    pub weekly_limit: u32,
    pub monthly_limit: u32,
    pub cutoff_hours_before: i64,
    /// Weekday names, e.g. `["mon", "fri"]`.
    #[serde(default)]
    pub required_office_days: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            seed: SeedConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
    seed: Option<SeedConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    /// Defaults, then an optional TOML file, then `REMOTEDAY_*` environment
    /// overrides, then programmatic overrides, then validation.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("remoteday.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(seed) = patch.seed {
            self.seed = seed;
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("REMOTEDAY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("REMOTEDAY_SERVER_PORT") {
            self.server.port = parse_u16("REMOTEDAY_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("REMOTEDAY_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("REMOTEDAY_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("REMOTEDAY_LOGGING_LEVEL").or_else(|| read_env("REMOTEDAY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("REMOTEDAY_LOGGING_FORMAT").or_else(|| read_env("REMOTEDAY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation("server.bind_address must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be greater than zero".into()));
        }
        self.seed.validate()?;
        Ok(())
    }
}

impl SeedConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut departments = std::collections::BTreeSet::new();
        for policy in &self.policies {
            let key = policy.department.trim().to_ascii_lowercase();
            if !departments.insert(key) {
                return Err(ConfigError::Validation(format!(
                    "duplicate policy for department `{}`",
                    policy.department
                )));
            }
            for day in &policy.required_office_days {
                parse_weekday(day)?;
            }
        }

        let ids: std::collections::BTreeSet<&str> =
            self.users.iter().map(|user| user.id.as_str()).collect();
        if ids.len() != self.users.len() {
            return Err(ConfigError::Validation("duplicate user id in seed".into()));
        }
        for user in &self.users {
            if let Some(manager_id) = &user.manager_id {
                if !ids.contains(manager_id.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "user `{}` references unknown manager `{manager_id}`",
                        user.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Materializes the seeded directory and policy set.
    pub fn build(&self) -> Result<(UserDirectory, PolicySet), ConfigError> {
        self.validate()?;

        let users = self
            .users
            .iter()
            .map(|user| User {
                id: UserId(user.id.clone()),
                role: user.role,
                department: user.department.clone(),
                manager_id: user.manager_id.clone().map(UserId),
            })
            .collect();

        let policies = self
            .policies
            .iter()
            .map(|policy| {
                let required_office_days = policy
                    .required_office_days
                    .iter()
                    .map(|day| parse_weekday(day))
                    .collect::<Result<Vec<Weekday>, ConfigError>>()?;
                Ok(RemotePolicy {
                    department: policy.department.clone(),
                    weekly_limit: policy.weekly_limit,
                    monthly_limit: policy.monthly_limit,
                    cutoff_hours_before: policy.cutoff_hours_before,
                    required_office_days,
                })
            })
            .collect::<Result<Vec<RemotePolicy>, ConfigError>>()?;

        Ok((UserDirectory::new(users), PolicySet::new(policies)))
    }
}

fn parse_weekday(raw: &str) -> Result<Weekday, ConfigError> {
    raw.trim().parse::<Weekday>().map_err(|_| {
        ConfigError::Validation(format!("unrecognized weekday `{raw}` in required_office_days"))
    })
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("remoteday.toml"), PathBuf::from("config/remoteday.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}
