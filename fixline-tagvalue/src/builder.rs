/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Outbound message construction.
//!
//! Callers describe a message as a template of `tag=value` tokens separated
//! by `|` (or SOH). The [`MessageBuilder`] owns the session-level fields and
//! produces the wire form:
//!
//! - tags 8, 9 and 10 are dropped and recomputed
//! - tag 34 gets the sequence number, 49/56 the configured CompIDs
//! - tag 52 gets the current time when left empty
//! - tag 108 gets the heartbeat interval in whole seconds

use crate::checksum::{calculate_checksum, format_checksum};
use fixline_core::error::EncodeError;
use fixline_core::field::tags;
use fixline_core::message::{PIPE, SOH};
use fixline_core::types::{SeqNum, Timestamp};

/// One token of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    /// Numeric tag.
    pub tag: u32,
    /// Caller-supplied value, possibly empty.
    pub value: String,
}

/// A validated outbound template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    fields: Vec<TemplateField>,
}

impl Template {
    /// Parses a `|` or SOH separated template.
    ///
    /// Empty tokens and tokens with an empty tag are skipped, as are the
    /// header and trailer tags the builder computes itself.
    ///
    /// # Errors
    /// Returns [`EncodeError::InvalidTag`] if a tag is not a decimal number.
    pub fn parse(template: &str) -> Result<Self, EncodeError> {
        let mut fields = Vec::new();
        for token in template.split(|c| c == PIPE || c == SOH as char) {
            let (tag, value) = token.split_once('=').unwrap_or((token, ""));
            if tag.is_empty() {
                continue;
            }
            let tag = parse_tag(tag).ok_or_else(|| EncodeError::InvalidTag(tag.to_string()))?;
            if matches!(tag, tags::BEGIN_STRING | tags::BODY_LENGTH | tags::CHECKSUM) {
                continue;
            }
            fields.push(TemplateField {
                tag,
                value: value.to_string(),
            });
        }
        Ok(Self { fields })
    }

    /// Returns the template fields in order.
    #[must_use]
    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    /// Returns the MsgType (tag 35) value, if the template has one.
    #[must_use]
    pub fn msg_type(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.tag == tags::MSG_TYPE)
            .map(|f| f.value.as_str())
    }
}

/// Parses a template tag. Only ASCII digits are accepted.
fn parse_tag(tag: &str) -> Option<u32> {
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tag.parse().ok()
}

/// Fills session fields into templates and frames them for the wire.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    /// BeginString value, e.g. `FIX.4.2`.
    begin_string: String,
    /// SenderCompID (tag 49).
    sender_comp_id: String,
    /// TargetCompID (tag 56).
    target_comp_id: String,
    /// HeartBtInt in seconds (tag 108).
    heartbeat_secs: u64,
}

impl MessageBuilder {
    /// Creates a builder for one session.
    ///
    /// # Arguments
    /// * `begin_string` - Full BeginString, e.g. `FIX.4.2`
    /// * `sender_comp_id` - Value written to tag 49
    /// * `target_comp_id` - Value written to tag 56
    /// * `heartbeat_secs` - Value written to tag 108
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
        heartbeat_secs: u64,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            heartbeat_secs,
        }
    }

    /// Returns the BeginString written to tag 8.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Builds the wire form of `template`.
    ///
    /// # Arguments
    /// * `template` - Parsed caller template
    /// * `seq` - Sequence number for tag 34
    /// * `now` - Time used when tag 52 is left empty
    #[must_use]
    pub fn build(&self, template: &Template, seq: SeqNum, now: Timestamp) -> String {
        let mut body = String::with_capacity(128);
        let mut num = itoa::Buffer::new();

        for field in template.fields() {
            body.push_str(num.format(field.tag));
            body.push('=');
            match field.tag {
                tags::MSG_SEQ_NUM => body.push_str(num.format(seq.value())),
                tags::SENDER_COMP_ID => body.push_str(&self.sender_comp_id),
                tags::TARGET_COMP_ID => body.push_str(&self.target_comp_id),
                tags::SENDING_TIME if field.value.is_empty() => {
                    body.push_str(&now.format_millis());
                }
                tags::HEART_BT_INT => body.push_str(num.format(self.heartbeat_secs)),
                _ => body.push_str(&field.value),
            }
            body.push(SOH as char);
        }

        let mut message = String::with_capacity(body.len() + 32);
        message.push_str("8=");
        message.push_str(&self.begin_string);
        message.push(SOH as char);
        message.push_str("9=");
        message.push_str(num.format(body.len()));
        message.push(SOH as char);
        message.push_str(&body);

        let checksum = format_checksum(calculate_checksum(message.as_bytes()));
        message.push_str("10=");
        message.extend(checksum.iter().map(|&d| d as char));
        message.push(SOH as char);
        message
    }

    /// Parses and builds a template in one step.
    ///
    /// # Errors
    /// Returns [`EncodeError::InvalidTag`] if the template is malformed.
    pub fn build_str(
        &self,
        template: &str,
        seq: SeqNum,
        now: Timestamp,
    ) -> Result<String, EncodeError> {
        Ok(self.build(&Template::parse(template)?, seq, now))
    }
}
