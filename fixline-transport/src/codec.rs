/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! Frames end at `<SOH>10=NNN<SOH>`; see [`Framer`]. When the peer closes
//! the connection, any unterminated tail is handed out as a last frame.

use bytes::{BufMut, BytesMut};
use fixline_core::error::{DecodeError, FixError};
use fixline_tagvalue::framer::{Frame, Framer};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

/// Errors that can occur during codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Buffered bytes exceed the maximum size without a trailer.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Bytes buffered.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CodecError> for FixError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MessageTooLarge { size, max_size } => {
                Self::Decode(DecodeError::MessageTooLarge { size, max_size })
            }
            CodecError::Io(err) => Self::Io(err),
        }
    }
}

/// Tokio codec yielding one raw FIX frame per item.
#[derive(Debug, Clone)]
pub struct FixCodec {
    /// Splits the buffer on the checksum trailer.
    framer: Framer,
    /// Maximum frame size in bytes.
    max_message_size: usize,
}

impl FixCodec {
    /// Creates a new codec with a 1 MiB frame limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            framer: Framer::new(),
            max_message_size: 1024 * 1024,
        }
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    fn take_frame(&self, src: &mut BytesMut, at_eof: bool) -> Result<Option<String>, CodecError> {
        match self.framer.next_frame(src, at_eof) {
            Frame::Complete { len } => {
                let frame = src.split_to(len);
                Ok(Some(into_text(&frame)))
            }
            Frame::NeedMore if src.len() > self.max_message_size => {
                Err(CodecError::MessageTooLarge {
                    size: src.len(),
                    max_size: self.max_message_size,
                })
            }
            Frame::NeedMore => Ok(None),
        }
    }
}

/// Converts frame bytes to text, replacing invalid UTF-8 sequences.
fn into_text(frame: &[u8]) -> String {
    match std::str::from_utf8(frame) {
        Ok(text) => text.to_owned(),
        Err(err) => {
            debug!(error = %err, "inbound frame is not valid utf-8");
            String::from_utf8_lossy(frame).into_owned()
        }
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.take_frame(src, false)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.take_frame(src, true)
    }
}

impl Encoder<&str> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(item.as_bytes());
        Ok(())
    }
}

/// Reads whole frames from the read half of a connection.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    buffer: BytesMut,
    codec: FixCodec,
    eof: bool,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wraps `reader` with the given codec.
    pub fn new(reader: R, codec: FixCodec) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(4096),
            codec,
            eof: false,
        }
    }

    /// Returns the next frame, or `None` once the peer has closed the
    /// connection and every buffered byte has been handed out.
    ///
    /// # Errors
    /// Returns [`CodecError`] on read failure or an oversized frame.
    pub async fn next_frame(&mut self) -> Result<Option<String>, CodecError> {
        loop {
            if self.eof {
                return self.codec.decode_eof(&mut self.buffer);
            }
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }
            if self.reader.read_buf(&mut self.buffer).await? == 0 {
                self.eof = true;
            }
        }
    }
}

/// Writes whole frames to the write half of a connection.
#[derive(Debug)]
pub struct FrameWriter<W> {
    writer: W,
    buffer: BytesMut,
    codec: FixCodec,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(512),
            codec: FixCodec::new(),
        }
    }

    /// Writes one frame and flushes it.
    ///
    /// # Errors
    /// Returns [`CodecError::Io`] if the socket write fails.
    pub async fn write_frame(&mut self, frame: &str) -> Result<(), CodecError> {
        self.buffer.clear();
        self.codec.encode(frame, &mut self.buffer)?;
        self.writer.write_all(&self.buffer).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Shuts down the write direction.
    ///
    /// # Errors
    /// Returns [`CodecError::Io`] if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<(), CodecError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HB: &str = "8=FIX.4.2\x019=5\x0135=0\x0110=161\x01";

    #[test]
    fn test_codec_decode_complete_message() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(HB.as_bytes());

        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some(HB));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_decode_incomplete() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&HB.as_bytes()[..HB.len() - 3]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), HB.len() - 3);
    }

    #[test]
    fn test_codec_decode_eof_flushes_tail() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x019=5\x0135=0"[..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(
            codec.decode_eof(&mut buf).unwrap().as_deref(),
            Some("8=FIX.4.2\x019=5\x0135=0")
        );
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_codec_too_large() {
        let mut codec = FixCodec::new().with_max_message_size(16);
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x019=5\x0135=0\x0158=xxxxxxxx"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::MessageTooLarge { max_size: 16, .. })
        ));
    }

    #[test]
    fn test_codec_error_into_fix_error() {
        let err: FixError = CodecError::MessageTooLarge {
            size: 2,
            max_size: 1,
        }
        .into();
        assert!(matches!(err, FixError::Decode(_)));
    }

    #[tokio::test]
    async fn test_frame_reader_splits_stream() {
        let (mut client, server) = tokio::io::duplex(64);
        let payload = format!("{HB}{HB}8=FIX.4.2\x019=5");
        tokio::spawn(async move {
            client.write_all(payload.as_bytes()).await.unwrap();
        });

        let mut reader = FrameReader::new(server, FixCodec::new());
        assert_eq!(reader.next_frame().await.unwrap().as_deref(), Some(HB));
        assert_eq!(reader.next_frame().await.unwrap().as_deref(), Some(HB));
        assert_eq!(
            reader.next_frame().await.unwrap().as_deref(),
            Some("8=FIX.4.2\x019=5")
        );
        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_frame_writer() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(client);
        writer.write_frame(HB).await.unwrap();
        drop(writer);

        let mut received = String::new();
        server.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, HB);
    }
}
