#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The communicative-act tag carried on every message.
///
/// This is a closed enumeration; unlike `clazz` (an open, application-defined
/// type tag) the performative vocabulary is fixed by the framework.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Performative {
    #[default]
    None,
    Request,
    Agree,
    Refuse,
    Failure,
    Inform,
    Confirm,
    Disconfirm,
    QueryIf,
    NotUnderstood,
    #[cfg_attr(feature = "serde", serde(rename = "CFP"))]
    CallForProposal,
    Propose,
    Cancel,
}

impl Performative {
    /// The literal token used on the wire, regardless of whether the `serde`
    /// feature (and thus `#[serde(rename...)]`) is enabled.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Request => "REQUEST",
            Self::Agree => "AGREE",
            Self::Refuse => "REFUSE",
            Self::Failure => "FAILURE",
            Self::Inform => "INFORM",
            Self::Confirm => "CONFIRM",
            Self::Disconfirm => "DISCONFIRM",
            Self::QueryIf => "QUERY_IF",
            Self::NotUnderstood => "NOT_UNDERSTOOD",
            Self::CallForProposal => "CFP",
            Self::Propose => "PROPOSE",
            Self::Cancel => "CANCEL",
        }
    }

    /// Parse the wire token back into a `Performative`. Unknown tokens decode
    /// as `None` rather than failing the whole frame.
    pub fn from_wire_str(s: &str) -> Self {
        match s {
            "REQUEST" => Self::Request,
            "AGREE" => Self::Agree,
            "REFUSE" => Self::Refuse,
            "FAILURE" => Self::Failure,
            "INFORM" => Self::Inform,
            "CONFIRM" => Self::Confirm,
            "DISCONFIRM" => Self::Disconfirm,
            "QUERY_IF" => Self::QueryIf,
            "NOT_UNDERSTOOD" => Self::NotUnderstood,
            "CFP" => Self::CallForProposal,
            "PROPOSE" => Self::Propose,
            "CANCEL" => Self::Cancel,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip_for_every_variant() {
        let all = [
            Performative::None,
            Performative::Request,
            Performative::Agree,
            Performative::Refuse,
            Performative::Failure,
            Performative::Inform,
            Performative::Confirm,
            Performative::Disconfirm,
            Performative::QueryIf,
            Performative::NotUnderstood,
            Performative::CallForProposal,
            Performative::Propose,
            Performative::Cancel,
        ];

        for p in all {
            assert_eq!(Performative::from_wire_str(p.as_wire_str()), p);
        }
    }

    #[test]
    fn unknown_token_decodes_as_none() {
        assert_eq!(Performative::from_wire_str("WHATEVER"), Performative::None);
    }
}
