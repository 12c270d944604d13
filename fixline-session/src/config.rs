/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Client configuration.
//!
//! The six connection parameters are required. Everything else has a
//! default matching the behaviour venues expect from this client.

use fixline_core::error::SessionError;
use fixline_tagvalue::builder::MessageBuilder;
use std::time::Duration;

/// Default pause between connection attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// Default capacity of the outbound queue.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 1024;

/// Default maximum inbound frame size.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Longest heartbeat interval accepted.
pub const MAX_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for a FIX client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connect timeout, also the default `expect` timeout.
    pub timeout: Duration,
    /// Heartbeat interval; tag 108 carries it in whole seconds.
    pub heartbeat_interval: Duration,
    /// Protocol version, e.g. `4.2` (or a full `FIX.4.2`).
    pub version: String,
    /// Venue address as `host:port`.
    pub address: String,
    /// Sender CompID (tag 49).
    pub sender_comp_id: String,
    /// Target CompID (tag 56).
    pub target_comp_id: String,
    /// Pause between connection attempts.
    pub reconnect_delay: Duration,
    /// Capacity of the outbound queue; sends beyond it are dropped.
    pub send_queue_capacity: usize,
    /// Maximum inbound frame size in bytes.
    pub max_message_size: usize,
    /// Whether to wrap the TCP stream in TLS.
    pub use_tls: bool,
    /// Whether to verify the venue certificate chain.
    pub verify_certificates: bool,
}

impl ClientConfig {
    /// Creates a configuration with the required connection parameters.
    ///
    /// # Arguments
    /// * `timeout` - Connect and expect timeout
    /// * `heartbeat_interval` - Heartbeat interval
    /// * `version` - Protocol version, e.g. `4.2`
    /// * `address` - Venue `host:port`
    /// * `sender_comp_id` - Sender CompID
    /// * `target_comp_id` - Target CompID
    #[must_use]
    pub fn new(
        timeout: Duration,
        heartbeat_interval: Duration,
        version: impl Into<String>,
        address: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            timeout,
            heartbeat_interval,
            version: version.into(),
            address: address.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            use_tls: true,
            verify_certificates: false,
        }
    }

    /// Sets the pause between connection attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the outbound queue capacity.
    #[must_use]
    pub const fn with_send_queue_capacity(mut self, capacity: usize) -> Self {
        self.send_queue_capacity = capacity;
        self
    }

    /// Sets the maximum inbound frame size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Enables or disables TLS.
    #[must_use]
    pub const fn with_tls(mut self, enabled: bool) -> Self {
        self.use_tls = enabled;
        self
    }

    /// Enables or disables certificate verification.
    #[must_use]
    pub const fn with_tls_verification(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    /// Returns the BeginString, `FIX.<version>`.
    #[must_use]
    pub fn begin_string(&self) -> String {
        if self.version.starts_with("FIX") {
            self.version.clone()
        } else {
            format!("FIX.{}", self.version)
        }
    }

    /// Returns the heartbeat interval in whole seconds.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }

    /// Returns the host part of the address, used as the TLS server name.
    #[must_use]
    pub fn host(&self) -> &str {
        self.address
            .rsplit_once(':')
            .map_or(self.address.as_str(), |(host, _)| host)
            .trim_start_matches('[')
            .trim_end_matches(']')
    }

    /// Returns a builder that stamps this session's fields into templates.
    #[must_use]
    pub fn message_builder(&self) -> MessageBuilder {
        MessageBuilder::new(
            self.begin_string(),
            self.sender_comp_id.clone(),
            self.target_comp_id.clone(),
            self.heartbeat_interval_secs(),
        )
    }

    /// Checks the configuration for values the engine cannot run with.
    ///
    /// # Errors
    /// Returns [`SessionError::Configuration`] describing the first problem.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.timeout.is_zero() {
            return Err(SessionError::Configuration("timeout must be non-zero".into()));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(SessionError::Configuration(
                "heartbeat interval must be non-zero".into(),
            ));
        }
        if self.heartbeat_interval > MAX_HEARTBEAT_INTERVAL {
            return Err(SessionError::Configuration(format!(
                "heartbeat interval must not exceed {}s",
                MAX_HEARTBEAT_INTERVAL.as_secs()
            )));
        }
        if self.version.is_empty() {
            return Err(SessionError::Configuration("version is required".into()));
        }
        let port = self.address.rsplit_once(':').map(|(_, port)| port);
        if port.is_none_or(|p| p.parse::<u16>().is_err()) {
            return Err(SessionError::Configuration(format!(
                "address {:?} is not host:port",
                self.address
            )));
        }
        if self.sender_comp_id.is_empty() || self.target_comp_id.is_empty() {
            return Err(SessionError::Configuration(
                "sender and target comp ids are required".into(),
            ));
        }
        if self.send_queue_capacity == 0 {
            return Err(SessionError::Configuration(
                "send queue capacity must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for client configuration.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    heartbeat_interval: Option<Duration>,
    version: Option<String>,
    address: Option<String>,
    sender_comp_id: Option<String>,
    target_comp_id: Option<String>,
    reconnect_delay: Option<Duration>,
    send_queue_capacity: Option<usize>,
    use_tls: Option<bool>,
    verify_certificates: bool,
}

impl ClientConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connect and expect timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets the protocol version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the venue address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the sender CompID.
    #[must_use]
    pub fn sender_comp_id(mut self, id: impl Into<String>) -> Self {
        self.sender_comp_id = Some(id.into());
        self
    }

    /// Sets the target CompID.
    #[must_use]
    pub fn target_comp_id(mut self, id: impl Into<String>) -> Self {
        self.target_comp_id = Some(id.into());
        self
    }

    /// Sets the reconnect delay.
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = Some(delay);
        self
    }

    /// Sets the outbound queue capacity.
    #[must_use]
    pub const fn send_queue_capacity(mut self, capacity: usize) -> Self {
        self.send_queue_capacity = Some(capacity);
        self
    }

    /// Enables or disables TLS.
    #[must_use]
    pub const fn tls(mut self, enabled: bool) -> Self {
        self.use_tls = Some(enabled);
        self
    }

    /// Enables or disables certificate verification.
    #[must_use]
    pub const fn verify_certificates(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// Returns [`SessionError::Configuration`] if a required parameter is
    /// missing or a value is unusable.
    pub fn build(self) -> Result<ClientConfig, SessionError> {
        fn required<T>(value: Option<T>, name: &str) -> Result<T, SessionError> {
            value.ok_or_else(|| SessionError::Configuration(format!("{name} is required")))
        }

        let mut config = ClientConfig::new(
            required(self.timeout, "timeout")?,
            required(self.heartbeat_interval, "heartbeat_interval")?,
            required(self.version, "version")?,
            required(self.address, "address")?,
            required(self.sender_comp_id, "sender_comp_id")?,
            required(self.target_comp_id, "target_comp_id")?,
        );
        if let Some(delay) = self.reconnect_delay {
            config.reconnect_delay = delay;
        }
        if let Some(capacity) = self.send_queue_capacity {
            config.send_queue_capacity = capacity;
        }
        if let Some(tls) = self.use_tls {
            config.use_tls = tls;
        }
        config.verify_certificates = self.verify_certificates;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientConfig {
        ClientConfig::new(
            Duration::from_secs(30),
            Duration::from_secs(30),
            "4.2",
            "fix.ftx.com:4363",
            "KEY",
            "FTX",
        )
    }

    #[test]
    fn test_client_config_new() {
        let config = sample();
        assert_eq!(config.begin_string(), "FIX.4.2");
        assert_eq!(config.heartbeat_interval_secs(), 30);
        assert_eq!(config.host(), "fix.ftx.com");
        assert_eq!(config.reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert_eq!(config.send_queue_capacity, 1024);
        assert!(config.use_tls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_begin_string_already_prefixed() {
        let mut config = sample();
        config.version = "FIX.4.4".to_string();
        assert_eq!(config.begin_string(), "FIX.4.4");
    }

    #[test]
    fn test_host_ipv6() {
        let mut config = sample();
        config.address = "[::1]:9876".to_string();
        assert_eq!(config.host(), "::1");
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let mut config = sample();
        config.address = "fix.ftx.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(SessionError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_heartbeat() {
        let mut config = sample();
        config.heartbeat_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_heartbeat() {
        let mut config = sample();
        config.heartbeat_interval = Duration::MAX;
        assert!(matches!(
            config.validate(),
            Err(SessionError::Configuration(_))
        ));

        config.heartbeat_interval = MAX_HEARTBEAT_INTERVAL;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfigBuilder::new()
            .timeout(Duration::from_secs(5))
            .heartbeat_interval(Duration::from_secs(1))
            .version("4.4")
            .address("127.0.0.1:9876")
            .sender_comp_id("CLIENT")
            .target_comp_id("VENUE")
            .tls(false)
            .reconnect_delay(Duration::from_millis(50))
            .build()
            .unwrap();

        assert_eq!(config.begin_string(), "FIX.4.4");
        assert!(!config.use_tls);
        assert_eq!(config.reconnect_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_builder_missing_field() {
        let err = ClientConfigBuilder::new()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Configuration("heartbeat_interval is required".to_string())
        );
    }

    #[test]
    fn test_message_builder_uses_config() {
        let builder = sample().message_builder();
        assert_eq!(builder.begin_string(), "FIX.4.2");
    }
}
