#![deny(missing_debug_implementations)]

//! Misuse-resistant data structures for the agent-gateway wire protocol.
//!
//! This crate has no knowledge of sockets or JSON framing; it only defines the
//! vocabulary ([`Aid`], [`Performative`], [`Value`], [`MessageId`]) and the two
//! message lifecycle types ([`OutboundMessage`], [`InboundMessage`]) that the
//! `agent-gateway` crate serializes and drives over the wire.

mod aid;
mod message;
mod message_id;
mod performative;
mod value;

pub use aid::{Aid, AidError};
pub use message::{InboundMessage, OutboundMessage};
pub use message_id::MessageId;
pub use performative::Performative;
pub use value::Value;
