/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Fixline Engine
//!
//! Reconnecting FIX client engine.
//!
//! This crate provides:
//! - **Client handle**: `send`, `expect` and `stop` against one venue session
//! - **Connection loop**: Connect, heartbeat, inactivity detection, reconnect
//! - **Correlation registry**: Routes inbound messages to waiting `expect` calls
//! - **Application trait**: Callback interface for connection events and messages
//! - **Builder API**: Fluent configuration for engine setup

pub mod application;
pub mod builder;
pub mod client;
pub mod registry;
mod session;

pub use application::{Application, NoOpApplication};
pub use builder::EngineBuilder;
pub use client::ClientHandle;
pub use registry::CorrelationRegistry;
