/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Fixline Tag-Value
//!
//! FIX tag=value wire handling for the fixline client engine.
//!
//! ## Features
//!
//! - **Framing**: Splits a byte stream on the checksum trailer
//! - **Templates**: Turns `35=D|55=BTC-PERP|` style templates into wire
//!   messages with header, session fields and checksum filled in
//! - **Field lists**: Accumulates fields and repeating groups into templates
//! - **Checksum calculation**: Sum of bytes modulo 256

pub mod builder;
pub mod checksum;
pub mod fields;
pub mod framer;

pub use builder::{MessageBuilder, Template, TemplateField};
pub use checksum::calculate_checksum;
pub use fields::{EncryptMethod, FieldList, HEARTBEAT_TEMPLATE, Logon};
pub use fixline_core::message::Message;
pub use framer::{Frame, Framer};
