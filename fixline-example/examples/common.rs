//! Common utilities shared across examples.

#![allow(dead_code)]

use std::env;
use std::time::Duration;

/// Default venue port.
pub const DEFAULT_PORT: u16 = 9878;

/// Default venue host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Example configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ExampleConfig {
    /// Venue hostname.
    pub host: String,
    /// Venue port.
    pub port: u16,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
    /// Heartbeat interval.
    pub heartbeat_interval: Duration,
    /// Whether to connect over TLS.
    pub tls: bool,
}

impl ExampleConfig {
    /// Creates a configuration for the client side.
    #[must_use]
    pub fn client() -> Self {
        Self {
            sender_comp_id: env::var("FIX_SENDER").unwrap_or_else(|_| "CLIENT".to_string()),
            target_comp_id: env::var("FIX_TARGET").unwrap_or_else(|_| "VENUE".to_string()),
            ..Self::base()
        }
    }

    /// Creates a configuration for the venue side.
    #[must_use]
    pub fn venue() -> Self {
        Self {
            sender_comp_id: env::var("FIX_SENDER").unwrap_or_else(|_| "VENUE".to_string()),
            target_comp_id: env::var("FIX_TARGET").unwrap_or_else(|_| "CLIENT".to_string()),
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            host: env::var("FIX_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("FIX_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            sender_comp_id: String::new(),
            target_comp_id: String::new(),
            heartbeat_interval: Duration::from_secs(
                env::var("FIX_HEARTBEAT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            tls: env::var("FIX_TLS").is_ok_and(|v| v == "1" || v == "true"),
        }
    }

    /// Returns the socket address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Initializes logging for examples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}
