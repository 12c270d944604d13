/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Fixline Store
//!
//! Storage of recently sent messages for the fixline client engine.
//!
//! Nothing is persisted: the cache lives for one connection and is cleared
//! on every reconnect together with the sequence numbers.

pub mod memory;

pub use memory::{ResendCache, RESEND_CACHE_TRIGGER, RESEND_CACHE_TRIM};
