//! Configuration loading and management

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind, e.g. "127.0.0.1:3000"
    pub bind_addr: String,
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; without one the server runs on in-memory stores
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Refuse plaintext connections
    #[serde(default = "default_require_ssl")]
    pub require_ssl: bool,
}

/// Sign-out path; not configurable
pub const LOGOUT_PATH: &str = "/logout";

/// Paths the dashboard navigates between
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesConfig {
    pub login: String,
    pub dashboard: String,
    /// Invoice listing; revalidated and redirected to after mutations
    pub invoices: String,
}

/// Session cookie settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
}

/// Revalidation event bus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    pub capacity: usize,
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default = "DatabaseConfig::default_config")]
    pub database: DatabaseConfig,
    #[serde(default = "RoutesConfig::default_config")]
    pub routes: RoutesConfig,
    #[serde(default = "SessionConfig::default_config")]
    pub session: SessionConfig,
    #[serde(default = "EventsConfig::default_config")]
    pub events: EventsConfig,
}

fn default_max_connections() -> u32 {
    5
}

fn default_require_ssl() -> bool {
    true
}

impl DatabaseConfig {
    fn default_config() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            require_ssl: default_require_ssl(),
        }
    }
}

impl RoutesConfig {
    fn default_config() -> Self {
        Self {
            login: "/login".to_string(),
            dashboard: "/dashboard".to_string(),
            invoices: "/dashboard/invoices".to_string(),
        }
    }
}

impl RoutesConfig {
    /// Every literal path the router mounts, paired with the setting it comes from
    pub fn fixed_paths(&self) -> [(&'static str, String); 5] {
        [
            ("routes.login", self.login.clone()),
            ("routes.login", LOGOUT_PATH.to_string()),
            ("routes.dashboard", self.dashboard.clone()),
            ("routes.invoices", self.invoices.clone()),
            ("routes.dashboard", format!("{}/customers", self.dashboard)),
        ]
    }
}

impl SessionConfig {
    fn default_config() -> Self {
        Self {
            cookie_name: "invoicer_session".to_string(),
            ttl_minutes: 60 * 24,
        }
    }
}

impl EventsConfig {
    fn default_config() -> Self {
        Self { capacity: 1024 }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `POSTGRES_URL` and `INVOICER_BIND_ADDR` from the environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var("POSTGRES_URL").ok(),
            std::env::var("INVOICER_BIND_ADDR").ok(),
        )
    }

    fn with_overrides(mut self, database_url: Option<String>, bind_addr: Option<String>) -> Self {
        if let Some(url) = database_url.filter(|u| !u.is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(addr) = bind_addr.filter(|a| !a.is_empty()) {
            self.server.bind_addr = addr;
        }
        self
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "server.bind_addr".to_string(),
                value: self.server.bind_addr.clone(),
                message: "expected host:port".to_string(),
            });
        }
        if self.session.ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.ttl_minutes".to_string(),
                value: self.session.ttl_minutes.to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.events.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.capacity".to_string(),
                value: "0".to_string(),
                message: "must be positive".to_string(),
            });
        }
        for (field, path) in [
            ("routes.login", &self.routes.login),
            ("routes.dashboard", &self.routes.dashboard),
            ("routes.invoices", &self.routes.invoices),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: path.clone(),
                    message: "must start with '/'".to_string(),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for (field, path) in self.routes.fixed_paths() {
            if !seen.insert(path.clone()) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: path,
                    message: "collides with another route".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Create a default configuration (in-memory, localhost)
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "127.0.0.1:3000".to_string(),
            },
            database: DatabaseConfig::default_config(),
            routes: RoutesConfig::default_config(),
            session: SessionConfig::default_config(),
            events: EventsConfig::default_config(),
        }
    }
}
