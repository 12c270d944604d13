/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Client handle.
//!
//! [`ClientHandle`] is the caller's view of one FIX client session. It is
//! cheap to clone; every clone drives the same engine. `send` never
//! suspends, `expect` suspends until a matching message arrives or its
//! timeout elapses.

use crate::application::Application;
use crate::registry::CorrelationRegistry;
use crate::session;
use fixline_core::error::{FixError, SessionError};
use fixline_core::message::Message;
use fixline_core::types::{SeqNum, Timestamp};
use fixline_session::config::ClientConfig;
use fixline_session::sequence::SequenceManager;
use fixline_session::state::{EngineState, StateCell};
use fixline_store::memory::ResendCache;
use fixline_tagvalue::builder::{MessageBuilder, Template};
use fixline_transport::connector::{Connector, TcpConnector, TlsConnector};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Item on the outbound queue.
#[derive(Debug)]
pub(crate) enum Outgoing {
    /// A complete frame ready for the wire.
    Frame(String),
    /// Tells the send loop to leave.
    Exit,
}

/// State shared between the handle and the engine task.
pub(crate) struct Shared {
    pub(crate) config: ClientConfig,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) sequence: SequenceManager,
    pub(crate) cache: ResendCache,
    pub(crate) registry: CorrelationRegistry,
    pub(crate) state: StateCell,
    pub(crate) attempts: AtomicU64,
    pub(crate) stop: CancellationToken,
    builder: MessageBuilder,
    stopped: AtomicBool,
    /// Sequence allocation and enqueue happen under this lock.
    outbound: Mutex<Option<mpsc::Sender<Outgoing>>>,
    pub(crate) receiver: Mutex<Option<mpsc::Receiver<Outgoing>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    /// Builds `template` and offers the frame to the outbound queue.
    ///
    /// The sequence number is consumed even when the frame is dropped.
    pub(crate) fn enqueue(&self, template: &str) -> Result<SeqNum, FixError> {
        let template = Template::parse(template)?;

        let outbound = self.outbound.lock();
        let seq = self.sequence.allocate_sender_seq();
        let frame = self.builder.build(&template, seq, Timestamp::now());

        if self.stopped.load(Ordering::Acquire) {
            debug!(%seq, "client stopped, dropping frame");
            return Ok(seq);
        }
        match outbound.as_ref() {
            Some(tx) => match tx.try_send(Outgoing::Frame(frame)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(%seq, "send queue full, dropping frame");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(%seq, "send queue closed, dropping frame");
                }
            },
            None => debug!(%seq, "send queue released, dropping frame"),
        }
        Ok(seq)
    }

    /// Prepares the session state for a new connection attempt.
    ///
    /// Frames still queued carry numbers from the previous numbering (or
    /// were sent before the engine ran), so they are dropped before the
    /// sequence restarts at 1. Runs under the enqueue lock so no frame
    /// numbered before the reset can slip in after the drain.
    ///
    /// Returns the number of frames dropped.
    pub(crate) fn reset_for_connection(&self, rx: &mut mpsc::Receiver<Outgoing>) -> usize {
        let _outbound = self.outbound.lock();
        let mut dropped = 0;
        while let Ok(outgoing) = rx.try_recv() {
            if let Outgoing::Frame(_) = outgoing {
                dropped += 1;
            }
        }
        self.sequence.reset();
        self.cache.clear();
        dropped
    }
}

/// Handle to a FIX client session.
#[derive(Clone)]
pub struct ClientHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("address", &self.shared.config.address)
            .field("state", &self.shared.state.get())
            .finish()
    }
}

impl ClientHandle {
    /// Creates a client using the connector implied by `config`: TLS when
    /// `use_tls` is set, plain TCP otherwise.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the TLS
    /// connector cannot be set up for the configured host.
    pub fn new(config: ClientConfig) -> Result<Self, FixError> {
        config.validate()?;
        let connector: Arc<dyn Connector> = if config.use_tls {
            Arc::new(TlsConnector::new(config.host(), config.verify_certificates)?)
        } else {
            Arc::new(TcpConnector::new())
        };
        Self::with_connector(config, connector)
    }

    /// Creates a client that opens connections through `connector`.
    ///
    /// # Errors
    /// Returns [`SessionError::Configuration`] if the configuration is invalid.
    pub fn with_connector(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, FixError> {
        config.validate()?;
        let (tx, rx) = mpsc::channel(config.send_queue_capacity);
        let shared = Shared {
            builder: config.message_builder(),
            connector,
            sequence: SequenceManager::new(),
            cache: ResendCache::new(),
            registry: CorrelationRegistry::new(),
            state: StateCell::new(),
            attempts: AtomicU64::new(0),
            stop: CancellationToken::new(),
            stopped: AtomicBool::new(false),
            outbound: Mutex::new(Some(tx)),
            receiver: Mutex::new(Some(rx)),
            task: Mutex::new(None),
            config,
        };
        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    /// Starts the engine on the current tokio runtime.
    ///
    /// The engine connects, reconnects after every failure, and reports
    /// to `app` until [`ClientHandle::stop`] is called.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyStarted`] on a second call, also
    /// after a stop.
    pub fn start<A: Application>(&self, app: A) -> Result<(), FixError> {
        let Some(rx) = self.shared.receiver.lock().take() else {
            return Err(SessionError::AlreadyStarted.into());
        };
        if self.shared.stopped.load(Ordering::Acquire) {
            return Err(SessionError::AlreadyStarted.into());
        }
        info!(
            address = %self.shared.config.address,
            sender = %self.shared.config.sender_comp_id,
            target = %self.shared.config.target_comp_id,
            "starting fix client"
        );
        let app: Arc<dyn Application> = Arc::new(app);
        let task = tokio::spawn(session::run(Arc::clone(&self.shared), app, rx));
        *self.shared.task.lock() = Some(task);
        Ok(())
    }

    /// Builds a message from a `tag=value|...` template and queues it.
    ///
    /// Header fields present in the template are filled in by the engine:
    /// 34 with the next sequence number, 49 and 56 from the configuration,
    /// 52 with the current time when left empty and 108 with the heartbeat
    /// interval. Never blocks: when the queue is full or the client is
    /// stopped, the frame is dropped and the sequence number stays consumed.
    /// Frames still queued when a connection attempt starts are dropped too.
    ///
    /// # Errors
    /// Returns [`fixline_core::EncodeError::InvalidTag`] for a non-numeric tag.
    pub fn send(&self, template: &str) -> Result<SeqNum, FixError> {
        self.shared.enqueue(template)
    }

    /// Waits for the first inbound message containing any of `filters`,
    /// up to the configured timeout.
    ///
    /// # Errors
    /// Returns [`SessionError::ExpectTimeout`] if nothing matched in time.
    pub async fn expect<S: AsRef<str>>(&self, filters: &[S]) -> Result<Message, FixError> {
        self.expect_within(filters, self.shared.config.timeout).await
    }

    /// Like [`ClientHandle::expect`] with an explicit timeout.
    ///
    /// # Errors
    /// Returns [`SessionError::ExpectTimeout`] if nothing matched in time.
    pub async fn expect_within<S: AsRef<str>>(
        &self,
        filters: &[S],
        timeout: Duration,
    ) -> Result<Message, FixError> {
        let (id, rx) = self.shared.registry.register(filters);
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(message)) => Ok(message),
            Ok(Err(_)) | Err(_) => {
                self.shared.registry.remove(id);
                Err(SessionError::ExpectTimeout {
                    waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    filters: filters.iter().map(|f| f.as_ref().to_owned()).collect(),
                }
                .into())
            }
        }
    }

    /// Stops the engine and releases the outbound queue.
    ///
    /// Waits for the engine task to finish, so the connection is closed
    /// when this returns. Calling it again is a no-op.
    pub async fn stop(&self) {
        if self.shared.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(tx) = self.shared.outbound.lock().as_ref() {
            // the token below stops the loops even if the queue is full
            let _ = tx.try_send(Outgoing::Exit);
        }
        self.shared.stop.cancel();

        let task = self.shared.task.lock().take();
        if let Some(task) = task
            && let Err(err) = task.await
        {
            warn!(error = %err, "engine task ended abnormally");
        }

        self.shared.outbound.lock().take();
        self.shared.receiver.lock().take();
        self.shared.state.transition(EngineState::Stopped);
        info!("fix client stopped");
    }

    /// Returns the current engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.state.get()
    }

    /// Returns the number of connection attempts made so far.
    #[must_use]
    pub fn connection_attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::Relaxed)
    }

    /// Returns the sequence number the next outbound message will carry.
    #[must_use]
    pub fn next_seq_num(&self) -> SeqNum {
        self.shared.sequence.next_sender_seq()
    }

    /// Returns the number of `expect` calls still waiting.
    #[must_use]
    pub fn pending_expectations(&self) -> usize {
        self.shared.registry.len()
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixline_core::error::EncodeError;

    fn config() -> ClientConfig {
        ClientConfig::new(
            Duration::from_millis(50),
            Duration::from_secs(30),
            "4.2",
            "127.0.0.1:9878",
            "CLIENT",
            "VENUE",
        )
        .with_tls(false)
        .with_send_queue_capacity(2)
    }

    #[test]
    fn test_send_assigns_consecutive_sequence_numbers() {
        let client = ClientHandle::new(config()).unwrap();
        assert_eq!(client.send("35=D|55=BTC-PERP|").unwrap(), SeqNum::new(1));
        assert_eq!(client.send("35=D|55=BTC-PERP|").unwrap(), SeqNum::new(2));
        assert_eq!(client.next_seq_num(), SeqNum::new(3));
    }

    #[test]
    fn test_send_full_queue_consumes_sequence() {
        let client = ClientHandle::new(config()).unwrap();
        for expected in 1..=3 {
            assert_eq!(client.send("35=0|").unwrap(), SeqNum::new(expected));
        }
        assert_eq!(client.next_seq_num(), SeqNum::new(4));
    }

    #[test]
    fn test_send_invalid_tag_keeps_sequence() {
        let client = ClientHandle::new(config()).unwrap();
        let err = client.send("35=D|abc=1|").unwrap_err();
        assert!(matches!(err, FixError::Encode(EncodeError::InvalidTag(_))));
        assert_eq!(client.next_seq_num(), SeqNum::new(1));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = config();
        config.address = "no-port".to_string();
        assert!(matches!(
            ClientHandle::new(config),
            Err(FixError::Session(SessionError::Configuration(_)))
        ));
    }

    #[tokio::test]
    async fn test_expect_times_out_and_cleans_up() {
        let client = ClientHandle::new(config()).unwrap();
        let err = client.expect(&["35=8", "150=A"]).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(client.pending_expectations(), 0);
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let client = ClientHandle::new(config()).unwrap();
        client.stop().await;
        client.stop().await;
        assert_eq!(client.state(), EngineState::Stopped);
        assert!(client.send("35=0|").is_ok());
        assert!(matches!(
            client.start(crate::application::NoOpApplication),
            Err(FixError::Session(SessionError::AlreadyStarted))
        ));
    }
}
