/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Byte stream framing.
//!
//! FIX frames are not length-prefixed at the transport level. A frame ends
//! with the checksum field, so the framer looks for `<SOH>10=` and cuts
//! eight bytes later (`<SOH>10=NNN<SOH>`). Body length is not consulted,
//! which keeps the framer tolerant of venues that miscount it.

use fixline_core::message::SOH;
use memchr::memmem;

/// Marker that starts the checksum trailer.
pub const TRAILER_MARKER: &[u8] = b"\x0110=";

/// Bytes from the start of the marker to the end of the frame.
pub const TRAILER_LEN: usize = 8;

/// Outcome of one framing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// No complete frame in the buffer yet.
    NeedMore,
    /// A frame occupies the first `len` bytes of the buffer.
    Complete {
        /// Number of bytes to consume.
        len: usize,
    },
}

/// Incremental splitter for an inbound byte stream.
#[derive(Debug, Clone)]
pub struct Framer {
    finder: memmem::Finder<'static>,
}

impl Framer {
    /// Creates a new framer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            finder: memmem::Finder::new(TRAILER_MARKER),
        }
    }

    /// Finds the next frame at the start of `buf`.
    ///
    /// When `at_eof` is set and no complete frame is present, whatever is
    /// left in the buffer is returned as a final frame so the tail of a
    /// closing connection is not lost. An empty buffer never yields a frame.
    #[must_use]
    pub fn next_frame(&self, buf: &[u8], at_eof: bool) -> Frame {
        if buf.is_empty() {
            return Frame::NeedMore;
        }
        if let Some(pos) = self.finder.find(buf)
            && buf.len() - pos >= TRAILER_LEN
        {
            return Frame::Complete {
                len: pos + TRAILER_LEN,
            };
        }
        if at_eof {
            return Frame::Complete { len: buf.len() };
        }
        Frame::NeedMore
    }

    /// Convenience wrapper returning `(consumed, frame)`.
    ///
    /// `consumed` is zero and `frame` is `None` while more data is needed.
    #[must_use]
    pub fn split<'a>(&self, buf: &'a [u8], at_eof: bool) -> (usize, Option<&'a [u8]>) {
        match self.next_frame(buf, at_eof) {
            Frame::NeedMore => (0, None),
            Frame::Complete { len } => (len, Some(&buf[..len])),
        }
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if `frame` ends with a complete checksum trailer.
#[must_use]
pub fn has_trailer(frame: &[u8]) -> bool {
    frame.len() >= TRAILER_LEN
        && frame.ends_with(&[SOH])
        && frame[frame.len() - TRAILER_LEN..].starts_with(TRAILER_MARKER)
}
