//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Event bus configuration.
    #[serde(default)]
    pub events: EventsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request deadline in seconds; 0 disables it.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: 0,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when acquiring a connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

/// Which transport carries domain events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Write events to the trace log only.
    #[default]
    Log,
    /// Keep events in process memory.
    Memory,
    /// Produce to Kafka/Redpanda.
    Kafka,
}

/// Event bus configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Transport implementation.
    #[serde(default)]
    pub transport: TransportKind,
    /// Comma-separated bootstrap brokers for the Kafka transport.
    #[serde(default)]
    pub brokers: String,
    /// Producer client id.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Delivery timeout for a single message, in milliseconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            brokers: String::new(),
            client_id: default_client_id(),
            send_timeout_ms: default_send_timeout(),
        }
    }
}

fn default_client_id() -> String {
    "ledgerline".to_string()
}

fn default_send_timeout() -> u64 {
    5000
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LEDGERLINE__DATABASE__URL", Some("postgres://localhost/ledger")),
                ("LEDGERLINE__SERVER__PORT", Some("9090")),
                ("LEDGERLINE__EVENTS__TRANSPORT", Some("memory")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/ledger");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.events.transport, TransportKind::Memory);
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars_unset(["LEDGERLINE__DATABASE__URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_events_defaults() {
        let events = EventsConfig::default();
        assert_eq!(events.transport, TransportKind::Log);
        assert_eq!(events.client_id, "ledgerline");
        assert_eq!(events.send_timeout_ms, 5000);
    }
}
