/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field accumulation helpers.
//!
//! [`FieldList`] collects `tag=value` entries and packs them into a
//! template for [`MessageBuilder`](crate::builder::MessageBuilder). Session
//! fields can be left empty; the builder fills them in.

use fixline_core::field::tags;
use std::fmt::{self, Display};

/// Template for an outbound Heartbeat.
pub const HEARTBEAT_TEMPLATE: &str = "35=0|49=|56=|34=|52=|";

/// Ordered collection of outbound fields.
///
/// Setting a tag that is already present replaces its value in place.
/// Repeating groups are appended with [`FieldList::add_group`] and may
/// repeat tags freely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    fields: Vec<(u32, String)>,
}

impl FieldList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list with MsgType and empty session header placeholders.
    #[must_use]
    pub fn with_msg_type(msg_type: &str) -> Self {
        let mut list = Self::new();
        list.add_field(tags::MSG_TYPE, msg_type);
        list.add_field(tags::SENDER_COMP_ID, "");
        list.add_field(tags::TARGET_COMP_ID, "");
        list.add_field(tags::MSG_SEQ_NUM, "");
        list.add_field(tags::SENDING_TIME, "");
        list
    }

    /// Creates a Heartbeat, echoing `test_req_id` when answering a TestRequest.
    #[must_use]
    pub fn heartbeat(test_req_id: Option<&str>) -> Self {
        let mut list = Self::with_msg_type("0");
        if let Some(id) = test_req_id {
            list.add_field(tags::TEST_REQ_ID, id);
        }
        list
    }

    /// Sets `tag` to `value`, replacing an existing value for the same tag.
    pub fn add_field(&mut self, tag: u32, value: impl Display) -> &mut Self {
        let value = value.to_string();
        match self.fields.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((tag, value)),
        }
        self
    }

    /// Appends a repeating group: the count under `count_tag`, then every
    /// entry's fields in order.
    pub fn add_group(&mut self, count_tag: u32, entries: &[FieldList]) -> &mut Self {
        self.add_field(count_tag, entries.len());
        for entry in entries {
            self.fields.extend(entry.fields.iter().cloned());
        }
        self
    }

    /// Returns the value for `tag`, if set.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Packs the entries into a `|` separated template.
    #[must_use]
    pub fn pack(&self) -> String {
        self.to_string()
    }
}

impl Display for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, value) in &self.fields {
            write!(f, "{tag}={value}|")?;
        }
        Ok(())
    }
}

/// EncryptMethod (tag 98) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EncryptMethod {
    /// None / other.
    #[default]
    None = 0,
    /// PKCS (proprietary).
    Pkcs = 1,
    /// DES (ECB mode).
    Des = 2,
    /// PKCS/DES (proprietary).
    PkcsDes = 3,
    /// PGP/DES (defunct).
    PgpDes = 4,
    /// PGP/DES-MD5.
    PgpDesMd5 = 5,
    /// PEM/DES-MD5.
    PemDesMd5 = 6,
}

/// Logon (35=A) message template.
///
/// Venue-specific authentication fields are added with [`Logon::field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logon {
    fields: FieldList,
}

impl Logon {
    /// Creates a Logon with no encryption and an empty HeartBtInt, which
    /// the builder fills from the session configuration.
    #[must_use]
    pub fn new() -> Self {
        let mut fields = FieldList::with_msg_type("A");
        fields.add_field(tags::ENCRYPT_METHOD, EncryptMethod::None as u8);
        fields.add_field(tags::HEART_BT_INT, "");
        Self { fields }
    }

    /// Sets EncryptMethod (tag 98).
    #[must_use]
    pub fn encrypt_method(mut self, method: EncryptMethod) -> Self {
        self.fields.add_field(tags::ENCRYPT_METHOD, method as u8);
        self
    }

    /// Sets SendingTime (tag 52) explicitly, e.g. when it is signed.
    #[must_use]
    pub fn sending_time(mut self, time: impl Display) -> Self {
        self.fields.add_field(tags::SENDING_TIME, time);
        self
    }

    /// Sets any other field, such as a venue signature.
    #[must_use]
    pub fn field(mut self, tag: u32, value: impl Display) -> Self {
        self.fields.add_field(tag, value);
        self
    }

    /// Returns the packed template.
    #[must_use]
    pub fn pack(&self) -> String {
        self.fields.pack()
    }
}

impl Default for Logon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_field_replaces() {
        let mut list = FieldList::new();
        list.add_field(55, "BTC-PERP").add_field(38, 0.01).add_field(55, "ETH-PERP");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(55), Some("ETH-PERP"));
        assert_eq!(list.pack(), "55=ETH-PERP|38=0.01|");
    }

    #[test]
    fn test_heartbeat_template() {
        assert_eq!(FieldList::heartbeat(None).pack(), HEARTBEAT_TEMPLATE);
        assert_eq!(
            FieldList::heartbeat(Some("T1")).pack(),
            "35=0|49=|56=|34=|52=|112=T1|"
        );
    }

    #[test]
    fn test_add_group() {
        let mut leg1 = FieldList::new();
        leg1.add_field(600, "BTC").add_field(624, 1);
        let mut leg2 = FieldList::new();
        leg2.add_field(600, "ETH").add_field(624, 2);

        let mut list = FieldList::with_msg_type("AB");
        list.add_group(555, &[leg1, leg2]);
        assert!(list.pack().ends_with("555=2|600=BTC|624=1|600=ETH|624=2|"));
    }

    #[test]
    fn test_logon() {
        let logon = Logon::new()
            .sending_time("20201111-03:17:14")
            .field(96, "deadbeef");
        assert_eq!(
            logon.pack(),
            "35=A|49=|56=|34=|52=20201111-03:17:14|98=0|108=|96=deadbeef|"
        );
    }

    #[test]
    fn test_encrypt_method() {
        let logon = Logon::new().encrypt_method(EncryptMethod::Des);
        assert!(logon.pack().contains("98=2|"));
    }
}
