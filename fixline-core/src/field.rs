/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field representation and well-known tags.
//!
//! Inbound fields are kept as text pairs exactly as they appeared on the
//! wire. Tags are compared as strings, so `"034"` and `"34"` are different
//! tags on the inbound side.

use std::fmt;

/// Well-known FIX tag numbers used by the session layer.
pub mod tags {
    /// BeginString.
    pub const BEGIN_STRING: u32 = 8;
    /// BodyLength.
    pub const BODY_LENGTH: u32 = 9;
    /// CheckSum.
    pub const CHECKSUM: u32 = 10;
    /// BeginSeqNo (ResendRequest).
    pub const BEGIN_SEQ_NO: u32 = 7;
    /// EndSeqNo (ResendRequest).
    pub const END_SEQ_NO: u32 = 16;
    /// MsgSeqNum.
    pub const MSG_SEQ_NUM: u32 = 34;
    /// MsgType.
    pub const MSG_TYPE: u32 = 35;
    /// NewSeqNo (SequenceReset).
    pub const NEW_SEQ_NO: u32 = 36;
    /// SenderCompID.
    pub const SENDER_COMP_ID: u32 = 49;
    /// SendingTime.
    pub const SENDING_TIME: u32 = 52;
    /// TargetCompID.
    pub const TARGET_COMP_ID: u32 = 56;
    /// EncryptMethod.
    pub const ENCRYPT_METHOD: u32 = 98;
    /// HeartBtInt.
    pub const HEART_BT_INT: u32 = 108;
    /// TestReqID.
    pub const TEST_REQ_ID: u32 = 112;
}

/// One `tag=value` pair of a parsed message.
///
/// A token that did not split into exactly one tag and one value is stored
/// as an empty field. Empty fields are never returned by lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Field {
    /// Tag text as it appeared on the wire.
    pub tag: String,
    /// Value text.
    pub value: String,
}

impl Field {
    /// Creates a field from a tag and value.
    #[must_use]
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }

    /// Parses a single wire token.
    ///
    /// Tokens with no `=` or with more than one `=` yield an empty field.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let mut parts = token.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(tag), Some(value), None) => Self::new(tag, value),
            _ => Self::default(),
        }
    }

    /// Returns true if this is the placeholder for a malformed token.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag.is_empty()
    }

    /// Returns true if this field carries `tag`.
    ///
    /// An empty field never matches, not even an empty tag.
    #[inline]
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        !self.is_empty() && self.tag == tag
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token() {
        let field = Field::from_token("55=BTC-PERP");
        assert_eq!(field.tag, "55");
        assert_eq!(field.value, "BTC-PERP");
        assert!(field.has_tag("55"));
    }

    #[test]
    fn test_from_token_empty_value() {
        let field = Field::from_token("52=");
        assert_eq!(field.tag, "52");
        assert_eq!(field.value, "");
    }

    #[test]
    fn test_from_token_malformed() {
        assert!(Field::from_token("garbage").is_empty());
        assert!(Field::from_token("96=a=b").is_empty());
        assert!(Field::from_token("").is_empty());
    }

    #[test]
    fn test_empty_field_never_matches() {
        let field = Field::default();
        assert!(!field.has_tag(""));
    }

    #[test]
    fn test_display() {
        assert_eq!(Field::new("35", "D").to_string(), "35=D");
    }
}
