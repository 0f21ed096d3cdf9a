use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::restrictions::ProofRestrictions;
use crate::errors::error::ProofTemplateErrorKind;

pub type PredicateValue = i32;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct NonRevokedInterval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<u64>,
}

impl NonRevokedInterval {
    #[must_use]
    pub const fn new(from: Option<u64>, to: Option<u64>) -> Self {
        Self { from, to }
    }

    /// Interval that only accepts credentials not revoked at `timestamp`.
    #[must_use]
    pub const fn at(timestamp: u64) -> Self {
        Self::new(Some(timestamp), Some(timestamp))
    }

    pub fn is_set(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestedAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(default)]
    pub restrictions: Vec<ProofRestrictions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

impl RequestedAttributes {
    /// All attribute names of this group, regardless of whether the request
    /// used `name` or `names`.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.name
            .iter()
            .chain(self.names.iter().flatten())
            .map(String::as_str)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestedPredicates {
    pub name: String,
    pub p_type: PredicateTypes,
    pub p_value: PredicateValue,
    #[serde(default)]
    pub restrictions: Vec<ProofRestrictions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum PredicateTypes {
    #[serde(rename = ">=")]
    GE,
    #[serde(rename = "<=")]
    LE,
    #[serde(rename = ">")]
    GT,
    #[serde(rename = "<")]
    LT,
}

impl PredicateTypes {
    pub const fn as_token(&self) -> &'static str {
        match self {
            Self::GE => ">=",
            Self::LE => "<=",
            Self::GT => ">",
            Self::LT => "<",
        }
    }
}

impl fmt::Display for PredicateTypes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::GE => write!(f, "GE"),
            Self::GT => write!(f, "GT"),
            Self::LE => write!(f, "LE"),
            Self::LT => write!(f, "LT"),
        }
    }
}

impl TryFrom<&str> for PredicateTypes {
    type Error = ProofTemplateErrorKind;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        match token {
            ">=" => Ok(Self::GE),
            "<=" => Ok(Self::LE),
            ">" => Ok(Self::GT),
            "<" => Ok(Self::LT),
            _ => Err(ProofTemplateErrorKind::UnknownOperator),
        }
    }
}

/// The presentation request body as understood by the agent.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProofRequest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default)]
    pub requested_attributes: BTreeMap<String, RequestedAttributes>,
    #[serde(default)]
    pub requested_predicates: BTreeMap<String, RequestedPredicates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

impl ProofRequest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            nonce: None,
            requested_attributes: BTreeMap::new(),
            requested_predicates: BTreeMap::new(),
            non_revoked: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requested_attributes.is_empty() && self.requested_predicates.is_empty()
    }
}

/// Element level issue that was skipped while compiling a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionWarning {
    pub kind: ProofTemplateErrorKind,
    pub message: String,
}

impl ConversionWarning {
    pub fn new(kind: ProofTemplateErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A compiled proof request bound to the connection it will be sent over.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PresentProofRequest {
    pub connection_id: String,
    pub proof_request: ProofRequest,
    #[serde(skip)]
    pub warnings: Vec<ConversionWarning>,
}
