/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Fixline Session
//!
//! FIX session layer building blocks for the fixline client engine.
//!
//! This crate provides:
//! - **Configuration**: Client configuration with a validating builder
//! - **Sequence management**: Atomic outbound sequence numbers
//! - **Liveness**: Heartbeat interval and inactivity deadline tracking
//! - **State**: Runtime connection lifecycle states

pub mod config;
pub mod heartbeat;
pub mod sequence;
pub mod state;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use heartbeat::LivenessMonitor;
pub use sequence::SequenceManager;
pub use state::{EngineState, StateCell};
