//! Client library for connecting to a distributed agent framework's master
//! container over a plain TCP socket.
//!
//! A [`Gateway`] owns the connection: a background thread frames and decodes
//! newline-delimited JSON off the wire, feeding application messages into an
//! inbox and control-operation replies into a pending-response table, while
//! callers send and receive from whichever thread they like.
//!
//! Agent identifiers ([`Aid`]), message objects ([`OutboundMessage`] /
//! [`InboundMessage`]), performatives, and attribute values live in
//! `agent-gateway-types`, re-exported here for convenience.

mod codec;
mod config;
mod error;
mod gateway;
mod inbox;
mod pending;
mod timeout;
mod transport;
mod wire;

pub use agent_gateway_types::{Aid, AidError, InboundMessage, MessageId, OutboundMessage, Performative, Value};
pub use config::GatewayConfig;
pub use error::{DecodeError, EncodeError, GatewayError};
pub use gateway::Gateway;
pub use timeout::Timeout;
