use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const ENV_VAR: &str = "ONBOARDING_ENV";
const HOST_VAR: &str = "ONBOARDING_HOST";
const PORT_VAR: &str = "ONBOARDING_PORT";
const LOG_LEVEL_VAR: &str = "ONBOARDING_LOG_LEVEL";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage the onboarding API runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Settings for the onboarding API process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Reads `ONBOARDING_*` variables, after loading a `.env` file when one exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source. The log filter is validated here so
    /// a bad `ONBOARDING_LOG_LEVEL` stops the process before anything is bound.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup(ENV_VAR)
            .map(|value| AppEnvironment::parse(&value))
            .unwrap_or(AppEnvironment::Development);

        let host = lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };

        let telemetry = TelemetryConfig {
            log_level: lookup(LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };
        telemetry
            .filter()
            .map_err(|source| ConfigError::InvalidLogLevel {
                value: telemetry.log_level.clone(),
                source,
            })?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry,
        })
    }

    /// Applies `--host` / `--port` from the command line over the loaded values.
    pub fn override_server(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Port 0 is refused: clients need a fixed address to reach the API.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort {
                value: self.port.to_string(),
            });
        }

        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost {
                    value: self.host.clone(),
                    source,
                })?
        };

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filter used when `RUST_LOG` is absent.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl TelemetryConfig {
    pub fn filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_new(&self.log_level)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },
    InvalidLogLevel {
        value: String,
        source: ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "{PORT_VAR} must be a port between 1 and 65535, got '{value}'")
            }
            ConfigError::InvalidHost { value, .. } => {
                write!(f, "{HOST_VAR} must be 'localhost' or an IP address, got '{value}'")
            }
            ConfigError::InvalidLogLevel { value, .. } => {
                write!(f, "{LOG_LEVEL_VAR} is not a valid log filter: '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort { .. } => None,
            ConfigError::InvalidHost { source, .. } => Some(source),
            ConfigError::InvalidLogLevel { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("defaults load");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn localhost_binds_to_loopback() {
        let config = config_from(&[(HOST_VAR, "LocalHost"), (PORT_VAR, "8080")])
            .expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));
    }

    #[test]
    fn non_numeric_port_is_reported_with_its_value() {
        let err = config_from(&[(PORT_VAR, "three-thousand")]).expect_err("port must be numeric");
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("three-thousand"));
    }

    #[test]
    fn unparsable_host_names_the_variable() {
        let config = config_from(&[(HOST_VAR, "onboarding.internal")]).expect("config loads");
        let err = config.server.socket_addr().expect_err("hostnames are not resolved");
        assert!(err.to_string().contains("ONBOARDING_HOST"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn command_line_port_zero_is_refused_at_bind() {
        let mut config = config_from(&[]).expect("defaults load");
        config.override_server(Some("0.0.0.0".to_string()), Some(0));

        assert_eq!(config.server.host, "0.0.0.0");
        assert!(matches!(
            config.server.socket_addr(),
            Err(ConfigError::InvalidPort { .. })
        ));
    }

    #[test]
    fn per_target_log_filters_are_accepted() {
        let config = config_from(&[(LOG_LEVEL_VAR, "onboarding=debug,tower_http=warn,info")])
            .expect("filter parses");
        assert!(config.telemetry.filter().is_ok());
    }

    #[test]
    fn environment_aliases_are_recognized() {
        assert_eq!(AppEnvironment::parse(" PROD "), AppEnvironment::Production);
        assert_eq!(AppEnvironment::parse("ci"), AppEnvironment::Test);
        assert_eq!(AppEnvironment::parse("staging"), AppEnvironment::Development);

        let config = config_from(&[(ENV_VAR, "production")]).expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
    }
}
