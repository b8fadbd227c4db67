use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An agent identifier: a name plus a flag distinguishing a topic from an agent.
///
/// Equality and hashing are by `(name, is_topic)`. Topic AIDs render on the
/// wire as `#name`; agent AIDs render as `name`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Aid {
    name: String,
    is_topic: bool,
}

impl Aid {
    /// Construct an AID that refers to an agent named `name`.
    pub fn agent(name: impl Into<String>) -> Result<Self, AidError> {
        let name = name.into();
        Self::verify(&name)?;
        Ok(Self {
            name,
            is_topic: false,
        })
    }

    /// Construct an AID that refers to a topic named `name`.
    pub fn topic(name: impl Into<String>) -> Result<Self, AidError> {
        let name = name.into();
        Self::verify(&name)?;
        Ok(Self {
            name,
            is_topic: true,
        })
    }

    /// Parse an AID from its wire representation. A leading `#` marks a topic.
    pub fn parse(wire: &str) -> Result<Self, AidError> {
        match wire.strip_prefix('#') {
            Some(rest) => Self::topic(rest),
            None => Self::agent(wire),
        }
    }

    /// Verify that `name` is a legal AID name: non-empty, no control
    /// characters, and no embedded `#` (which would be ambiguous with the
    /// topic marker).
    pub fn verify(name: impl AsRef<str>) -> Result<(), AidError> {
        let name = name.as_ref();

        if name.is_empty() {
            return Err(AidError::Empty);
        }

        if let Some(position) = name
            .bytes()
            .position(|b| b.is_ascii_control() || b == b'#')
        {
            return Err(AidError::ByteNotAllowed {
                found: name.as_bytes()[position],
                position,
            });
        }

        Ok(())
    }

    /// The bare name, without the `#` topic marker.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this AID refers to a topic.
    pub fn is_topic(&self) -> bool {
        self.is_topic
    }

    /// The wire representation of this AID (`name` or `#name`).
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_topic {
            write!(f, "#{}", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum AidError {
    #[error("AID name must not be empty")]
    Empty,
    #[error("invalid byte b'\\x{found:02x}' at index {position} in AID name")]
    ByteNotAllowed { found: u8, position: usize },
}
