//! JSON shapes exchanged on the wire. Kept separate from `codec` so the
//! serde-facing structs stay free of any decoding/encoding policy.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use agent_gateway_types::Value;

use crate::error::DecodeError;

/// The envelope plus attribute map of a single message, as it appears either
/// nested under a `send` action's `"message"` field, or bare under a
/// stand-alone message frame's `"message"` field.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireMessageBody {
    pub id: String,
    pub clazz: String,
    pub perf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "inReplyTo")]
    pub in_reply_to: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, WireValue>,
}

/// A single attribute value on the wire. Plain scalars are written as
/// ordinary JSON; byte arrays and float arrays are written as a tagged
/// object so they survive round-tripping through a JSON layer that doesn't
/// otherwise distinguish "array of numbers" from "binary blob".
///
/// Variant order matters here: serde tries each in turn, and a JSON number
/// written with a decimal point or exponent (e.g. `42.0`) fails to
/// deserialize as `i64` before it is tried as `f64`, which is exactly what
/// preserves the int/float distinction across the wire.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Binary(WireBinary),
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireBinary {
    pub clazz: String,
    pub data: String,
}

const BYTE_ARRAY_TAG: &str = "[B";
const FLOAT_ARRAY_TAG: &str = "[F";

impl From<&Value> for WireValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Str(s) => WireValue::Str(s.clone()),
            Value::Int(i) => WireValue::Int(*i),
            Value::Float(f) => WireValue::Float(*f),
            Value::Bool(b) => WireValue::Bool(*b),
            Value::Bytes(bytes) => WireValue::Binary(WireBinary {
                clazz: BYTE_ARRAY_TAG.to_owned(),
                data: BASE64.encode(bytes),
            }),
            Value::Floats(floats) => {
                let mut bytes = Vec::with_capacity(floats.len() * 4);
                for f in floats {
                    bytes.extend_from_slice(&f.to_le_bytes());
                }
                WireValue::Binary(WireBinary {
                    clazz: FLOAT_ARRAY_TAG.to_owned(),
                    data: BASE64.encode(bytes),
                })
            }
        }
    }
}

impl WireValue {
    pub(crate) fn into_value(self) -> Result<Value, DecodeError> {
        match self {
            WireValue::Bool(b) => Ok(Value::Bool(b)),
            WireValue::Int(i) => Ok(Value::Int(i)),
            WireValue::Float(f) => Ok(Value::Float(f)),
            WireValue::Str(s) => Ok(Value::Str(s)),
            WireValue::Binary(WireBinary { clazz, data }) => {
                let bytes = BASE64.decode(data)?;
                match clazz.as_str() {
                    FLOAT_ARRAY_TAG => {
                        if bytes.len() % 4 != 0 {
                            return Err(DecodeError::FloatArrayLength(bytes.len()));
                        }
                        let floats = bytes
                            .chunks_exact(4)
                            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                            .collect();
                        Ok(Value::Floats(floats))
                    }
                    _ => Ok(Value::Bytes(bytes)),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireActionRequest {
    pub action: String,
    pub id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireActionResponse {
    pub id: String,
    #[serde(rename = "inResponseTo")]
    pub in_response_to: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessageFrame {
    pub message: WireMessageBody,
}
