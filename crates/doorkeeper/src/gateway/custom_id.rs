//! Typed interaction identifiers.
//!
//! Discord reports button presses and modal submissions with an opaque
//! `custom_id` string. The wire spellings
//! (`authorization/{token}/{allow|deny}`, `register/{id}`, `update/{id}`,
//! `registration/{id}`, `updation/{id}`) are kept, but dispatch happens on
//! these enums: the set of categories is fixed and non-overlapping, so
//! there is no prefix scanning and no undefined precedence.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::registry::Verdict;

/// Identifier attached to a message component (button).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlId {
    /// Allow/Deny button of a login prompt.
    Authorization { token: Uuid, verdict: Verdict },
    /// "Register" button of an announcement.
    Register { server_id: String },
    /// "Update" button of an announcement.
    Update { server_id: String },
}

/// Identifier attached to a modal submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalId {
    Registration { server_id: String },
    Updation { server_id: String },
}

/// Error for a custom id that matches no known category or shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed custom id: {0}")]
pub struct MalformedId(String);

fn verdict_from_str(s: &str) -> Option<Verdict> {
    match s {
        "allow" => Some(Verdict::Allow),
        "deny" => Some(Verdict::Deny),
        _ => None,
    }
}

impl FromStr for ControlId {
    type Err = MalformedId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedId(s.to_string());
        let mut parts = s.splitn(2, '/');
        let category = parts.next().ok_or_else(malformed)?;
        let rest = parts.next().ok_or_else(malformed)?;

        match category {
            "authorization" => {
                let (token, verdict) = rest.split_once('/').ok_or_else(malformed)?;
                let token = Uuid::parse_str(token).map_err(|_| malformed())?;
                let verdict = verdict_from_str(verdict).ok_or_else(malformed)?;
                Ok(ControlId::Authorization { token, verdict })
            }
            "register" if !rest.is_empty() => Ok(ControlId::Register {
                server_id: rest.to_string(),
            }),
            "update" if !rest.is_empty() => Ok(ControlId::Update {
                server_id: rest.to_string(),
            }),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlId::Authorization { token, verdict } => {
                let verdict = match verdict {
                    Verdict::Allow => "allow",
                    Verdict::Deny => "deny",
                };
                write!(f, "authorization/{token}/{verdict}")
            }
            ControlId::Register { server_id } => write!(f, "register/{server_id}"),
            ControlId::Update { server_id } => write!(f, "update/{server_id}"),
        }
    }
}

impl FromStr for ModalId {
    type Err = MalformedId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedId(s.to_string());
        let (category, server_id) = s.split_once('/').ok_or_else(malformed)?;
        if server_id.is_empty() {
            return Err(malformed());
        }
        match category {
            "registration" => Ok(ModalId::Registration {
                server_id: server_id.to_string(),
            }),
            "updation" => Ok(ModalId::Updation {
                server_id: server_id.to_string(),
            }),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalId::Registration { server_id } => write!(f, "registration/{server_id}"),
            ModalId::Updation { server_id } => write!(f, "updation/{server_id}"),
        }
    }
}
