// src/message.rs

//! # Session object model (message)
//!
//! The values that flow out of a session: events, the messages inside them,
//! their field values, and the correlation ids tying them to requests.

use std::fmt::{self, Debug, Display};
use uuid::Uuid;

/// ## `BusMessage` Trait
///
/// Marker for anything that can travel over the [`EventBus`](crate::bus::EventBus).
/// `Clone` lets a broadcast channel hand a copy to each subscriber.
pub trait BusMessage: Clone + Debug + Send + Sync + 'static {}

/// Token associating a request with the messages answering it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// A fresh, unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scalar field value in a request or message.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Writes `name = { FIELD = value ... }` the way the vendor prints elements.
pub(crate) fn fmt_fields(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    fields: &[(String, FieldValue)],
) -> fmt::Result {
    writeln!(f, "{name} = {{")?;
    for (field, value) in fields {
        writeln!(f, "    {field} = {value}")?;
    }
    write!(f, "}}")
}

/// Kind of activity an [`Event`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Terminal reply for a correlation id.
    Response,
    /// Intermediate reply; more follows.
    PartialResponse,
    RequestStatus,
    SessionStatus,
    ServiceStatus,
    Admin,
    Timeout,
    Other(i32),
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response => write!(f, "RESPONSE"),
            Self::PartialResponse => write!(f, "PARTIAL_RESPONSE"),
            Self::RequestStatus => write!(f, "REQUEST_STATUS"),
            Self::SessionStatus => write!(f, "SESSION_STATUS"),
            Self::ServiceStatus => write!(f, "SERVICE_STATUS"),
            Self::Admin => write!(f, "ADMIN"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Other(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// One logical message inside an [`Event`].
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub message_type: String,
    pub correlation_id: Option<CorrelationId>,
    pub fields: Vec<(String, FieldValue)>,
}

impl Message {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            correlation_id: None,
            fields: Vec::new(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, v)| v)
    }

    /// Uncorrelated messages are treated as addressed to every request.
    pub fn belongs_to(&self, correlation_id: CorrelationId) -> bool {
        self.correlation_id.map_or(true, |id| id == correlation_id)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fields(f, &self.message_type, &self.fields)
    }
}

/// A unit of session activity, polled with `Session::next_event`.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub messages: Vec<Message>,
}

impl Event {
    pub fn new(kind: EventKind, messages: Vec<Message>) -> Self {
        Self { kind, messages }
    }
}
impl BusMessage for Event {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prints_like_an_element() {
        let msg = Message::new("CreateOrder")
            .with_field("EMSX_SEQUENCE", 42i64)
            .with_field("MESSAGE", "Order created");
        assert_eq!(
            msg.to_string(),
            "CreateOrder = {\n    EMSX_SEQUENCE = 42\n    MESSAGE = \"Order created\"\n}"
        );
    }

    #[test]
    fn uncorrelated_messages_belong_to_any_request() {
        let ours = CorrelationId::new();
        let theirs = CorrelationId::new();
        assert!(Message::new("SessionStarted").belongs_to(ours));
        assert!(Message::new("X").with_correlation_id(ours).belongs_to(ours));
        assert!(!Message::new("X").with_correlation_id(theirs).belongs_to(ours));
    }

    #[test]
    fn int_reads_as_float() {
        assert_eq!(FieldValue::Int(3).as_float(), Some(3.0));
        assert_eq!(FieldValue::from("x").as_int(), None);
    }
}
