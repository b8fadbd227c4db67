use std::collections::HashMap;

use crate::{aid::Aid, message_id::MessageId, performative::Performative, value::Value};

/// A message under construction, not yet sent.
///
/// `OutboundMessage` only exposes setters and adders. There is no "read-only
/// mode" to violate by construction: the source library's permissive,
/// silently-ignored setter-on-a-received-message behavior simply has no
/// counterpart here, because a received message is a different Rust type
/// ([`InboundMessage`]) that has no setters at all.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    id: MessageId,
    clazz: String,
    performative: Performative,
    sender: Option<Aid>,
    recipient: Option<Aid>,
    in_reply_to: Option<MessageId>,
    attributes: HashMap<String, Value>,
}

impl OutboundMessage {
    /// Create a new message with a fresh, random id.
    pub fn new(clazz: impl Into<String>, performative: Performative) -> Self {
        Self {
            id: MessageId::new(),
            clazz: clazz.into(),
            performative,
            sender: None,
            recipient: None,
            in_reply_to: None,
            attributes: HashMap::new(),
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn set_recipient(&mut self, recipient: Aid) -> &mut Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn set_sender(&mut self, sender: Aid) -> &mut Self {
        self.sender = Some(sender);
        self
    }

    pub fn set_in_reply_to(&mut self, id: MessageId) -> &mut Self {
        self.in_reply_to = Some(id);
        self
    }

    pub fn add_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.into(), Value::Str(value.into()));
        self
    }

    pub fn add_int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.attributes.insert(key.into(), Value::Int(value));
        self
    }

    pub fn add_float(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.attributes.insert(key.into(), Value::Float(value));
        self
    }

    pub fn add_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.attributes.insert(key.into(), Value::Bool(value));
        self
    }

    pub fn add_byte_array(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.attributes.insert(key.into(), Value::Bytes(value));
        self
    }

    pub fn add_float_array(&mut self, key: impl Into<String>, value: Vec<f32>) -> &mut Self {
        self.attributes.insert(key.into(), Value::Floats(value));
        self
    }

    // -- Accessors used by the wire codec (`agent-gateway`) to serialize this
    // message. Kept `pub` rather than `pub(crate)` since the codec lives in a
    // separate crate within the workspace.

    pub fn clazz(&self) -> &str {
        &self.clazz
    }

    pub fn performative(&self) -> Performative {
        self.performative
    }

    pub fn sender(&self) -> Option<&Aid> {
        self.sender.as_ref()
    }

    pub fn recipient(&self) -> Option<&Aid> {
        self.recipient.as_ref()
    }

    pub fn in_reply_to(&self) -> Option<&MessageId> {
        self.in_reply_to.as_ref()
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }
}

/// A message received from the wire, in read-only form.
///
/// `InboundMessage` only exposes getters. It is produced by the wire codec
/// and handed to callers by `Gateway::receive`/`Gateway::request`; there is no
/// way to mutate it and send it back out, matching the source contract that
/// a received message is read-only.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    id: MessageId,
    clazz: String,
    performative: Performative,
    sender: Option<Aid>,
    recipient: Option<Aid>,
    in_reply_to: Option<MessageId>,
    attributes: HashMap<String, Value>,
}

impl InboundMessage {
    /// Construct an `InboundMessage` from its decoded wire parts. Used by the
    /// codec; not normally called directly by application code.
    #[allow(clippy::too_many_arguments)]
    pub fn from_wire(
        id: MessageId,
        clazz: String,
        performative: Performative,
        sender: Option<Aid>,
        recipient: Option<Aid>,
        in_reply_to: Option<MessageId>,
        attributes: HashMap<String, Value>,
    ) -> Self {
        Self {
            id,
            clazz,
            performative,
            sender,
            recipient,
            in_reply_to,
            attributes,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn clazz(&self) -> &str {
        &self.clazz
    }

    pub fn performative(&self) -> Performative {
        self.performative
    }

    pub fn sender(&self) -> Option<&Aid> {
        self.sender.as_ref()
    }

    pub fn recipient(&self) -> Option<&Aid> {
        self.recipient.as_ref()
    }

    pub fn in_reply_to(&self) -> Option<&MessageId> {
        self.in_reply_to.as_ref()
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.attributes.get(key) {
            Some(Value::Str(s)) => s.clone(),
            _ => default.to_owned(),
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.attributes.get(key) {
            Some(Value::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.attributes.get(key) {
            Some(Value::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.attributes.get(key) {
            Some(Value::Bool(v)) => *v,
            _ => default,
        }
    }

    /// Returns an empty vector when the key is absent or of another type,
    /// rather than the source convention of a null-buffer length probe
    /// (there is no separate "how big would this be" step in idiomatic
    /// Rust — the caller just inspects the returned `Vec`'s length).
    pub fn get_byte_array(&self, key: &str) -> Vec<u8> {
        match self.attributes.get(key) {
            Some(Value::Bytes(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    pub fn get_float_array(&self, key: &str) -> Vec<f32> {
        match self.attributes.get(key) {
            Some(Value::Floats(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_builder_chains_and_records_attributes() {
        let mut msg = OutboundMessage::new("org.x.Ping", Performative::Request);
        msg.add_int("n", 42).add_string("label", "hi");

        assert_eq!(msg.clazz(), "org.x.Ping");
        assert_eq!(msg.performative(), Performative::Request);
        assert_eq!(msg.attributes().get("n"), Some(&Value::Int(42)));
        assert_eq!(
            msg.attributes().get("label"),
            Some(&Value::Str("hi".to_owned()))
        );
    }

    #[test]
    fn inbound_getters_fall_back_to_default_on_absence_or_mismatch() {
        let mut attrs = HashMap::new();
        attrs.insert("n".to_owned(), Value::Int(42));

        let msg = InboundMessage::from_wire(
            MessageId::new(),
            "org.x.Ping".to_owned(),
            Performative::Inform,
            None,
            None,
            None,
            attrs,
        );

        assert_eq!(msg.get_int("n", -1), 42);
        assert_eq!(msg.get_int("missing", -1), -1);
        assert_eq!(msg.get_string("n", "fallback"), "fallback");
        assert_eq!(msg.get_byte_array("n"), Vec::<u8>::new());
    }
}
