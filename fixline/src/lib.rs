/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Fixline
//!
//! A reconnecting FIX client engine for Rust.
//!
//! Fixline keeps one initiator session alive against a venue: it connects
//! over TLS (or plain TCP), heartbeats, drops and re-opens the connection
//! when the venue goes quiet, and lets callers send template messages and
//! wait for matching replies.
//!
//! ## Features
//!
//! - **Templates**: Messages are written as `tag=value|...`; header fields,
//!   body length and checksum are filled in by the engine
//! - **Correlation**: `expect` waits for the first inbound message containing
//!   any of a set of substrings
//! - **Liveness**: Heartbeats on an interval, reconnect after two silent
//!   intervals
//! - **Async**: Built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixline::prelude::*;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new(
//!     Duration::from_secs(5),
//!     Duration::from_secs(30),
//!     "4.2",
//!     "fix.venue.example:4443",
//!     "CLIENT",
//!     "VENUE",
//! );
//! let client = EngineBuilder::new(config).start(NoOpApplication)?;
//! client.send("35=D|11=order-1|55=BTC-PERP|54=1|38=0.01|40=2|44=50000|")?;
//! let report = client.expect(&["35=8", "35=9"]).await?;
//! client.stop().await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Errors, parsed messages and shared types
//! - [`tagvalue`]: Framing, checksums and the template builder
//! - [`session`]: Configuration, sequence numbers, liveness and state
//! - [`store`]: Resend cache of recently sent frames
//! - [`transport`]: Codec and TCP/TLS connectors
//! - [`engine`]: Client handle and connection loop

pub mod core {
    //! Errors, parsed messages and shared types.
    pub use fixline_core::*;
}

pub mod tagvalue {
    //! Framing, checksums and the template builder.
    pub use fixline_tagvalue::*;
}

pub mod session {
    //! Configuration, sequence numbers, liveness and state.
    pub use fixline_session::*;
}

pub mod store {
    //! Resend cache of recently sent frames.
    pub use fixline_store::*;
}

pub mod transport {
    //! Codec and TCP/TLS connectors.
    pub use fixline_transport::*;
}

pub mod engine {
    //! Client handle and connection loop.
    pub use fixline_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixline_core::{
        DecodeError, EncodeError, Field, FixError, Message, MsgType, Result, SeqNum, SessionError,
        Timestamp, tags,
    };

    // Tag-value encoding
    pub use fixline_tagvalue::{EncryptMethod, FieldList, Logon, MessageBuilder, calculate_checksum};

    // Session
    pub use fixline_session::{ClientConfig, ClientConfigBuilder, EngineState};

    // Store
    pub use fixline_store::ResendCache;

    // Transport
    pub use fixline_transport::{Connector, TcpConnector, TlsConnector};

    // Engine
    pub use fixline_engine::{Application, ClientHandle, EngineBuilder, NoOpApplication};
}
