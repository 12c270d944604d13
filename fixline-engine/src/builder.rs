/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Engine builder for fluent configuration.
//!
//! Wraps a [`ClientConfig`] and an optional [`Connector`] override and
//! produces a [`ClientHandle`].

use crate::application::Application;
use crate::client::ClientHandle;
use fixline_core::error::FixError;
use fixline_session::config::ClientConfig;
use fixline_transport::connector::{Connector, TcpConnector};
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring a FIX client engine.
#[derive(Debug)]
pub struct EngineBuilder {
    /// Session configuration.
    config: ClientConfig,
    /// Connector override; `None` picks TLS or TCP from the configuration.
    connector: Option<Arc<dyn Connector>>,
}

impl EngineBuilder {
    /// Creates a builder for `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            connector: None,
        }
    }

    /// Uses `connector` to open connections.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Uses plain TCP, e.g. for a venue simulator on localhost.
    #[must_use]
    pub fn with_plain_tcp(mut self) -> Self {
        self.config.use_tls = false;
        self.connector = Some(Arc::new(TcpConnector::new()));
        self
    }

    /// Sets the pause between connection attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay = delay;
        self
    }

    /// Sets the outbound queue capacity.
    #[must_use]
    pub const fn with_send_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.send_queue_capacity = capacity;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the client without starting it.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the connector
    /// cannot be created.
    pub fn build(self) -> Result<ClientHandle, FixError> {
        match self.connector {
            Some(connector) => ClientHandle::with_connector(self.config, connector),
            None => ClientHandle::new(self.config),
        }
    }

    /// Builds the client and starts it with `app`.
    ///
    /// # Errors
    /// Returns an error if the client cannot be built.
    pub fn start<A: Application>(self, app: A) -> Result<ClientHandle, FixError> {
        let client = self.build()?;
        client.start(app)?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixline_core::error::SessionError;
    use fixline_session::state::EngineState;

    fn config() -> ClientConfig {
        ClientConfig::new(
            Duration::from_secs(5),
            Duration::from_secs(30),
            "4.4",
            "fix.example.com:9881",
            "CLIENT",
            "VENUE",
        )
    }

    #[test]
    fn test_engine_builder_defaults() {
        let builder = EngineBuilder::new(config());
        assert!(builder.config().use_tls);
        assert_eq!(builder.config().reconnect_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_engine_builder_plain_tcp() {
        let client = EngineBuilder::new(config())
            .with_plain_tcp()
            .with_reconnect_delay(Duration::from_millis(50))
            .with_send_queue_capacity(8)
            .build()
            .unwrap();
        assert!(!client.config().use_tls);
        assert_eq!(client.config().send_queue_capacity, 8);
        assert_eq!(client.state(), EngineState::Disconnected);
    }

    #[test]
    fn test_engine_builder_tls() {
        let client = EngineBuilder::new(config()).build().unwrap();
        assert_eq!(client.config().begin_string(), "FIX.4.4");
    }

    #[test]
    fn test_engine_builder_invalid_capacity() {
        let result = EngineBuilder::new(config())
            .with_send_queue_capacity(0)
            .build();
        assert!(matches!(
            result,
            Err(FixError::Session(SessionError::Configuration(_)))
        ));
    }
}
