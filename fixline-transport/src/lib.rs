/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Fixline Transport
//!
//! Network transport layer for the fixline FIX client engine.
//!
//! This crate provides:
//! - **Codec**: Tokio codec that frames inbound bytes on the checksum trailer
//! - **Frame I/O**: Reader and writer halves speaking whole frames
//! - **Connectors**: Plain TCP and TLS (rustls) connection establishment

pub mod codec;
pub mod connector;

pub use codec::{CodecError, FixCodec, FrameReader, FrameWriter};
pub use connector::{BoxedStream, Connector, FixStream, TcpConnector, TlsConnector};
