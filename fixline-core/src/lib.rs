/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Fixline Core
//!
//! Core types shared by every fixline crate:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Message**: Parsed inbound message with cursor-based tag lookup
//! - **Message types**: The [`MsgType`] enumeration used for dispatch
//! - **Core types**: [`SeqNum`], [`Timestamp`] and well-known field tags
//!
//! Messages keep their raw text next to the parsed pairs, so correlation can
//! match on substrings while application code walks fields by tag.

pub mod error;
pub mod field;
pub mod message;
pub mod types;

pub use error::{DecodeError, EncodeError, FixError, Result, SessionError};
pub use field::{Field, tags};
pub use message::{Message, MsgType, SOH};
pub use types::{SeqNum, Timestamp};
