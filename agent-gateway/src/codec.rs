//! Encoding and decoding of wire frames.
//!
//! Three frame shapes travel over the connection: action requests (either
//! direction), action responses (either direction), and bare message frames
//! (master to client only, for application message delivery). Frame kind is
//! determined structurally, by which of `action` / `inResponseTo` / `message`
//! key is present, rather than by a separate discriminant field.

use std::collections::HashMap;

use agent_gateway_types::{Aid, InboundMessage, MessageId, OutboundMessage, Performative};

use crate::error::{DecodeError, EncodeError};
use crate::wire::{WireActionRequest, WireActionResponse, WireMessageBody, WireMessageFrame, WireValue};

/// A decoded frame read from the connection.
#[derive(Debug)]
pub(crate) enum InboundFrame {
    Message(InboundMessage),
    ActionRequest {
        id: MessageId,
        action: String,
        params: serde_json::Map<String, serde_json::Value>,
    },
    ActionResponse {
        id: MessageId,
        in_response_to: String,
        result: serde_json::Map<String, serde_json::Value>,
    },
}

pub(crate) fn decode_line(line: &str) -> Result<InboundFrame, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    let obj = value.as_object().ok_or(DecodeError::NotAnObject)?;

    if obj.contains_key("action") {
        let req: WireActionRequest = serde_json::from_value(value)?;
        return Ok(InboundFrame::ActionRequest {
            id: MessageId::from_wire(req.id),
            action: req.action,
            params: req.extra,
        });
    }

    if obj.contains_key("inResponseTo") {
        let resp: WireActionResponse = serde_json::from_value(value)?;
        return Ok(InboundFrame::ActionResponse {
            id: MessageId::from_wire(resp.id),
            in_response_to: resp.in_response_to,
            result: resp.extra,
        });
    }

    if obj.contains_key("message") {
        let frame: WireMessageFrame = serde_json::from_value(value)?;
        return Ok(InboundFrame::Message(decode_message_body(frame.message)?));
    }

    Err(DecodeError::UnknownShape)
}

fn decode_message_body(body: WireMessageBody) -> Result<InboundMessage, DecodeError> {
    let sender = body.sender.as_deref().map(Aid::parse).transpose()?;
    let recipient = body.recipient.as_deref().map(Aid::parse).transpose()?;

    let mut attributes = HashMap::with_capacity(body.data.len());
    for (key, value) in body.data {
        attributes.insert(key, value.into_value()?);
    }

    Ok(InboundMessage::from_wire(
        MessageId::from_wire(body.id),
        body.clazz,
        Performative::from_wire_str(&body.perf),
        sender,
        recipient,
        body.in_reply_to.map(MessageId::from_wire),
        attributes,
    ))
}

fn message_body_for_wire(msg: &OutboundMessage) -> WireMessageBody {
    let data = msg
        .attributes()
        .iter()
        .map(|(k, v)| (k.clone(), WireValue::from(v)))
        .collect();

    WireMessageBody {
        id: msg.id().to_string(),
        clazz: msg.clazz().to_owned(),
        perf: msg.performative().as_wire_str().to_owned(),
        sender: msg.sender().map(Aid::to_wire),
        recipient: msg.recipient().map(Aid::to_wire),
        in_reply_to: msg.in_reply_to().map(MessageId::to_string),
        data,
    }
}

/// Encode an application message as a `send` action request.
pub(crate) fn encode_send(msg: &OutboundMessage) -> Result<String, EncodeError> {
    let body = message_body_for_wire(msg);
    let frame = serde_json::json!({
        "action": "send",
        "id": msg.id().as_str(),
        "message": body,
    });
    Ok(serde_json::to_string(&frame)?)
}

/// Encode a client-initiated control action request, merging `extra` fields
/// into the top-level object alongside `action` and `id`.
pub(crate) fn encode_action_request(
    action: &str,
    id: &MessageId,
    extra: serde_json::Value,
) -> Result<String, EncodeError> {
    let mut map = serde_json::Map::new();
    map.insert("action".to_owned(), serde_json::json!(action));
    map.insert("id".to_owned(), serde_json::json!(id.as_str()));
    if let serde_json::Value::Object(fields) = extra {
        map.extend(fields);
    }
    Ok(serde_json::to_string(&serde_json::Value::Object(map))?)
}

/// Encode a client reply to a master-initiated query, naming the action it
/// answers in `inResponseTo`.
pub(crate) fn encode_action_response(
    in_response_to: &str,
    id: &MessageId,
    extra: serde_json::Value,
) -> Result<String, EncodeError> {
    let mut map = serde_json::Map::new();
    map.insert("id".to_owned(), serde_json::json!(id.as_str()));
    map.insert("inResponseTo".to_owned(), serde_json::json!(in_response_to));
    if let serde_json::Value::Object(fields) = extra {
        map.extend(fields);
    }
    Ok(serde_json::to_string(&serde_json::Value::Object(map))?)
}
