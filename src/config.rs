//! Environment-variable configuration.

use std::env;

use crate::error::{Error, Result};
use crate::ingest::DEFAULT_BATCH_SIZE;

const DEFAULT_APP_NAME: &str = "portstream";
const DEFAULT_LOG_LEVEL: &str = "debug";
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Deployment environment; anything other than `PROD` is treated as test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Server bind/endpoint settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub hostname: String,
    pub port: u16,
}

impl ServerSettings {
    /// Address the server binary binds to.
    pub fn bind_addr(&self) -> String {
        let host = if self.hostname.is_empty() {
            "0.0.0.0"
        } else {
            &self.hostname
        };
        format!("{host}:{}", self.port)
    }

    /// Base URL clients use to reach the server.
    pub fn base_url(&self) -> String {
        let host = if self.hostname.is_empty() {
            "localhost"
        } else {
            &self.hostname
        };
        format!("http://{host}:{}", self.port)
    }
}

/// Ingestor settings.
#[derive(Debug, Clone)]
pub struct IngestorSettings {
    pub batch_size: usize,
    pub filepath: Option<String>,
}

/// Loaded process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub environment: Environment,
    /// A `tracing` filter directive, e.g. `debug` or `portstream=debug,info`.
    pub log_level: String,
    pub server: ServerSettings,
    pub ingestor: IngestorSettings,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Recognised variables: `APP_NAME`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `SERVER_HOSTNAME`, `SERVER_PORT`, `INGESTOR_BATCH_SIZE`,
    /// `INGESTOR_FILEPATH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let environment = match lookup("ENVIRONMENT") {
            Some(v) if v.to_uppercase() == "PROD" => Environment::Production,
            _ => Environment::Test,
        };

        let batch_size = parse_positive("INGESTOR_BATCH_SIZE", lookup("INGESTOR_BATCH_SIZE"))?
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let port = match lookup("SERVER_PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid SERVER_PORT: '{v}'")))?,
            None => DEFAULT_SERVER_PORT,
        };

        Ok(Settings {
            app_name: lookup("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_owned()),
            environment,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            server: ServerSettings {
                hostname: lookup("SERVER_HOSTNAME").unwrap_or_default(),
                port,
            },
            ingestor: IngestorSettings {
                batch_size,
                filepath: lookup("INGESTOR_FILEPATH"),
            },
        })
    }
}

fn parse_positive(name: &str, value: Option<String>) -> Result<Option<usize>> {
    let Some(v) = value else {
        return Ok(None);
    };

    match v.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(Error::Config(format!("invalid {name}: '{v}'"))),
    }
}

#[cfg(test)]
mod config_spec {
    use std::collections::HashMap;

    use super::{Environment, Settings};
    use crate::error::Error;
    use crate::ingest::DEFAULT_BATCH_SIZE;

    fn load(vars: &[(&str, &str)]) -> Result<Settings, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = load(&[]).unwrap();

        assert_eq!("portstream", settings.app_name);
        assert_eq!(Environment::Test, settings.environment);
        assert_eq!(DEFAULT_BATCH_SIZE, settings.ingestor.batch_size);
        assert_eq!("0.0.0.0:8080", settings.server.bind_addr());
        assert_eq!("http://localhost:8080", settings.server.base_url());
        assert!(settings.ingestor.filepath.is_none());
    }

    #[test]
    fn reads_overrides() {
        let settings = load(&[
            ("ENVIRONMENT", "prod"),
            ("SERVER_HOSTNAME", "ports.internal"),
            ("SERVER_PORT", "9000"),
            ("INGESTOR_BATCH_SIZE", "50"),
            ("INGESTOR_FILEPATH", "ports.json"),
        ])
        .unwrap();

        assert!(settings.environment.is_production());
        assert_eq!("ports.internal:9000", settings.server.bind_addr());
        assert_eq!("http://ports.internal:9000", settings.server.base_url());
        assert_eq!(50, settings.ingestor.batch_size);
        assert_eq!(Some("ports.json".to_owned()), settings.ingestor.filepath);
    }

    #[test]
    fn rejects_non_numeric_batch_size() {
        assert!(matches!(
            load(&[("INGESTOR_BATCH_SIZE", "abc")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn rejects_zero_batch_size() {
        assert!(matches!(
            load(&[("INGESTOR_BATCH_SIZE", "0")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_server_port() {
        assert!(matches!(
            load(&[("SERVER_PORT", "99999")]),
            Err(Error::Config(_))
        ));
    }
}
