/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message types for the FIX protocol.
//!
//! This module provides:
//! - [`Message`]: An inbound message with its raw text, ordered fields and a
//!   read cursor for walking repeating groups
//! - [`MsgType`]: Enumeration of the message types the session layer knows

use crate::field::Field;
use memchr::memchr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOH (Start of Header) field separator.
pub const SOH: u8 = 0x01;

/// Pipe separator accepted in place of SOH in hand-written text.
pub const PIPE: char = '|';

/// FIX message types the session layer dispatches on.
///
/// Anything else is kept verbatim as `Custom(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Order Cancel Reject (9).
    OrderCancelReject,
    /// Logon (A) - Session level.
    Logon,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Order Cancel/Replace Request (G).
    OrderCancelReplaceRequest,
    /// Order Status Request (H).
    OrderStatusRequest,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "A" => Self::Logon,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "G" => Self::OrderCancelReplaceRequest,
            "H" => Self::OrderStatusRequest,
            "j" => Self::BusinessMessageReject,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the wire value of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::OrderCancelReplaceRequest => "G",
            Self::OrderStatusRequest => "H",
            Self::BusinessMessageReject => "j",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns true if this is an administrative message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed FIX message.
///
/// Holds the raw text as received and the ordered list of fields. Duplicate
/// tags are kept in wire order so repeating groups can be walked with
/// [`Message::next`] and bounded with [`Message::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Raw message text.
    raw: String,
    /// Fields in wire order.
    fields: Vec<Field>,
    /// Index of the next field `next` and `find` will inspect.
    cursor: usize,
}

impl Message {
    /// Parses a message from its raw text.
    ///
    /// Fields are split on SOH. Text without a single SOH is split on `|`
    /// instead, which makes log lines and test fixtures readable.
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let fields = if memchr(SOH, raw.as_bytes()).is_some() {
            raw.split(SOH as char).map(Field::from_token).collect()
        } else {
            raw.split(PIPE).map(Field::from_token).collect()
        };
        Self {
            raw,
            fields,
            cursor: 0,
        }
    }

    /// Returns the raw message text.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns all fields in wire order, including empty placeholders.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of tokens the message split into.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the message has no tokens.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the current cursor position.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor back to the first field.
    #[inline]
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Returns the first value for `tag`, scanning from the start.
    ///
    /// The cursor is not affected.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.has_tag(tag))
            .map(|field| field.value.as_str())
    }

    /// Returns the next value for `tag` at or after the cursor.
    ///
    /// The cursor advances past every field inspected, matched or not, so
    /// repeated calls walk successive occurrences of a repeating tag.
    pub fn next(&mut self, tag: &str) -> Option<&str> {
        while self.cursor < self.fields.len() {
            let pos = self.cursor;
            self.cursor += 1;
            if self.fields[pos].has_tag(tag) {
                return Some(self.fields[pos].value.as_str());
            }
        }
        None
    }

    /// Looks ahead from the cursor for `tag` without moving the cursor.
    ///
    /// The scan gives up as soon as it meets a field whose tag is one of
    /// `stop_tags`, which bounds the search to the current group entry.
    #[must_use]
    pub fn find(&self, tag: &str, stop_tags: &[&str]) -> Option<&str> {
        for field in self.fields.iter().skip(self.cursor) {
            if field.is_empty() {
                continue;
            }
            if stop_tags.iter().any(|stop| field.tag == *stop) {
                return None;
            }
            if field.tag == tag {
                return Some(field.value.as_str());
            }
        }
        None
    }

    /// Returns the message type (tag 35), if present.
    #[must_use]
    pub fn msg_type(&self) -> Option<MsgType> {
        self.get("35")?.parse().ok()
    }
}

impl fmt::Display for Message {
    /// Shows the message with SOH rendered as `|`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw.replace(SOH as char, "|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_report() -> Message {
        Message::parse(
            "8=FIX.4.2\x019=40\x0135=8\x01150=A\x01268=2\x01269=0\x01270=10\x01269=1\x01271=5\x0110=000\x01",
        )
    }

    #[test]
    fn test_parse_soh() {
        let msg = fill_report();
        assert_eq!(msg.get("35"), Some("8"));
        assert_eq!(msg.get("150"), Some("A"));
        assert_eq!(msg.msg_type(), Some(MsgType::ExecutionReport));
        // trailing SOH leaves one empty token
        assert!(msg.fields().last().unwrap().is_empty());
    }

    #[test]
    fn test_parse_pipe_fallback() {
        let msg = Message::parse("35=8|150=A|37=XYZ|");
        assert_eq!(msg.get("37"), Some("XYZ"));
        assert_eq!(msg.to_string(), "35=8|150=A|37=XYZ|");
    }

    #[test]
    fn test_pipe_ignored_when_soh_present() {
        let msg = Message::parse("58=a|b\x0135=0\x01");
        assert_eq!(msg.get("58"), Some("a|b"));
    }

    #[test]
    fn test_get_does_not_move_cursor() {
        let mut msg = fill_report();
        assert_eq!(msg.get("269"), Some("0"));
        assert_eq!(msg.cursor(), 0);
        assert_eq!(msg.next("269"), Some("0"));
        assert_eq!(msg.get("269"), Some("0"));
    }

    #[test]
    fn test_next_walks_repeating_group() {
        let mut msg = fill_report();
        assert_eq!(msg.next("269"), Some("0"));
        assert_eq!(msg.next("269"), Some("1"));
        assert_eq!(msg.next("269"), None);

        msg.reset_cursor();
        assert_eq!(msg.next("269"), Some("0"));
    }

    #[test]
    fn test_next_advances_past_misses() {
        let mut msg = fill_report();
        assert_eq!(msg.next("999"), None);
        assert_eq!(msg.cursor(), msg.len());
        assert_eq!(msg.next("35"), None);
    }

    #[test]
    fn test_find_stops_at_boundary() {
        let mut msg = fill_report();
        assert_eq!(msg.next("269"), Some("0"));
        assert_eq!(msg.find("270", &["269"]), Some("10"));
        let cursor = msg.cursor();

        // 271 only exists in the second entry, past the 269 boundary
        assert_eq!(msg.find("271", &["269"]), None);
        assert_eq!(msg.find("271", &[]), Some("5"));
        assert_eq!(msg.cursor(), cursor);
    }

    #[test]
    fn test_malformed_tokens_never_match() {
        let mut msg = Message::parse("35=8|junk|=|96=a=b|");
        assert_eq!(msg.get(""), None);
        assert_eq!(msg.get("96"), None);
        assert_eq!(msg.find("", &[]), None);
        assert_eq!(msg.next(""), None);
    }

    #[test]
    fn test_msg_type_custom() {
        let msg = Message::parse("35=U1|");
        assert_eq!(msg.msg_type(), Some(MsgType::Custom("U1".to_string())));
        assert_eq!(Message::parse("55=X|").msg_type(), None);
    }

    #[test]
    fn test_msg_type_admin() {
        assert!(MsgType::Heartbeat.is_admin());
        assert!(MsgType::Logon.is_admin());
        assert!(!MsgType::ExecutionReport.is_admin());
        assert_eq!(MsgType::SequenceReset.as_str(), "4");
    }
}
