use serde::{Deserialize, Serialize};

use std::{
    env, fmt, fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Postgres DSN. Without one the notes live in memory.
    #[serde(default)]
    pub pg_dsn: Option<String>,
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
    /// "*" or a comma-separated list of origins
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Endpoint receiving JSON events. Events are only logged when unset.
    #[serde(default)]
    pub dsn: Option<String>,
    #[serde(default = "default_traces_sample_rate")]
    pub traces_sample_rate: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            traces_sample_rate: default_traces_sample_rate(),
        }
    }
}

const fn default_port() -> u16 {
    3001
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_cors_allowed_origins() -> String {
    "*".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_traces_sample_rate() -> f64 {
    1.0
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file '{}'", path.display()),
            Self::Environment => f.write_str("environment variables"),
        }
    }
}

impl Config {
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validated()
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Builds the config from variables resolved by `lookup`, so that tests
    /// don't have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = port_from(&lookup)?.unwrap_or_else(default_port);

        let traces_sample_rate = match lookup("TELEMETRY_TRACES_SAMPLE_RATE") {
            Some(rate) => rate.parse().map_err(|e| ConfigError::InvalidValue {
                name: "TELEMETRY_TRACES_SAMPLE_RATE".to_string(),
                reason: format!("{e}"),
            })?,
            None => default_traces_sample_rate(),
        };

        let config = Self {
            port,
            pg_dsn: lookup("PG_DSN").filter(|dsn| !dsn.is_empty()),
            images_dir: lookup("IMAGES_DIR").map_or_else(default_images_dir, PathBuf::from),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(default_cors_allowed_origins),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(default_log_level),
            telemetry: TelemetryConfig {
                dsn: lookup("TELEMETRY_DSN").filter(|dsn| !dsn.is_empty()),
                traces_sample_rate,
            },
        };

        config.validated()
    }

    /// `PORT` from `lookup` wins over the port already set.
    pub fn with_port_override<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = port_from(&lookup)? {
            self.port = port;
        }
        Ok(self)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.telemetry.traces_sample_rate.is_nan() {
            return Err(ConfigError::InvalidValue {
                name: "traces_sample_rate".to_string(),
                reason: "not a number".to_string(),
            });
        }
        self.telemetry.traces_sample_rate = self.telemetry.traces_sample_rate.clamp(0.0, 1.0);
        Ok(self)
    }
}

fn port_from<F>(lookup: &F) -> Result<Option<u16>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("PORT")
        .map(|port| {
            port.parse().map_err(|e| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("{e}"),
            })
        })
        .transpose()
}

/// Tries the file named by `NOTES_API_CONFIG`, then `config.yaml`, then the
/// environment. `PORT` from the environment applies to file configs too.
pub fn load_config() -> Result<(Config, ConfigSource), ConfigError> {
    let config_path = env::var("NOTES_API_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    for path in [config_path.as_str(), "config.yaml"] {
        let path = Path::new(path);
        if path.exists() {
            let config = Config::from_yaml_file(path)?.with_port_override(|name| env::var(name).ok())?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }
    }

    Ok((Config::from_env()?, ConfigSource::Environment))
}
