use std::collections::HashMap;

use crate::{
    builder::{RestrictionScope, SchemaRequestBuilder},
    data_types::{
        pres_request::{NonRevokedInterval, PredicateTypes, PredicateValue},
        template::CredentialType,
    },
    errors::error::prelude::*,
    revocation::RevocationTimestampProvider,
};

pub const EQUALS: &str = "==";
pub const ISSUED_BY: &str = "issued-by";
pub const SCHEMA_ID: &str = "schema-id";
pub const NON_REVOKED: &str = "<R";

/// Behaviour behind a condition token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    /// Reveals the attribute and restricts it to one value.
    Equals,
    /// Proves a relation on an integer attribute without revealing it.
    Relational(PredicateTypes),
    IssuedBy,
    SchemaId,
    /// Requires the credential not to be revoked at the given (or current)
    /// epoch second.
    NonRevoked,
}

impl ConditionOperator {
    /// Operators that need an attribute name to work on.
    pub fn attribute_only_level(&self) -> bool {
        matches!(self, Self::Equals | Self::Relational(_))
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Self::Relational(_))
    }

    pub fn apply(
        &self,
        builder: &mut SchemaRequestBuilder,
        attribute_name: Option<&str>,
        value: Option<&str>,
        timestamps: &RevocationTimestampProvider,
    ) -> ProofTemplateResult<()> {
        trace!(
            "ConditionOperator::apply >>> operator: {:?}, attribute: {:?}, value: {:?}",
            self,
            attribute_name,
            value
        );
        match *self {
            Self::Equals => {
                let name = require_attribute(self, attribute_name)?;
                let value = require_value(self, value)?.to_string();
                builder.add_attribute(name);
                builder.put_restriction(RestrictionScope::Attribute(name), |restriction| {
                    restriction.add_attribute_value_restriction(name, value.clone());
                });
            }
            Self::Relational(p_type) => {
                let name = require_attribute(self, attribute_name)?;
                let p_value = parse_predicate_value(require_value(self, value)?)?;
                builder.add_predicate(name, p_type, p_value);
            }
            Self::IssuedBy => {
                let issuer_did = require_value(self, value)?.to_string();
                builder.put_restriction(attribute_name.into(), |restriction| {
                    restriction.issuer_did = Some(issuer_did.clone());
                });
            }
            Self::SchemaId => {
                let schema_id = require_value(self, value)?.to_string();
                builder.put_restriction(attribute_name.into(), |restriction| {
                    restriction.schema_id = Some(schema_id.clone());
                });
            }
            Self::NonRevoked => {
                let timestamp = match value.map(str::trim).filter(|value| !value.is_empty()) {
                    Some(value) => value.parse::<u64>().map_err(|err| {
                        ProofTemplateError::from_msg(
                            ProofTemplateErrorKind::InvalidConditionValue,
                            format!("Non revocation timestamp `{}` is not valid: {}", value, err),
                        )
                    })?,
                    None => timestamps.get(),
                };
                builder.set_non_revoked(NonRevokedInterval::at(timestamp));
            }
        }
        Ok(())
    }
}

fn require_attribute<'a>(
    operator: &ConditionOperator,
    attribute_name: Option<&'a str>,
) -> ProofTemplateResult<&'a str> {
    attribute_name.ok_or_else(|| {
        ProofTemplateError::from_msg(
            ProofTemplateErrorKind::InvalidInput,
            format!("Operator {:?} can only be applied to an attribute", operator),
        )
    })
}

fn require_value<'a>(
    operator: &ConditionOperator,
    value: Option<&'a str>,
) -> ProofTemplateResult<&'a str> {
    value.ok_or_else(|| {
        ProofTemplateError::from_msg(
            ProofTemplateErrorKind::InvalidConditionValue,
            format!("Operator {:?} requires a value", operator),
        )
    })
}

fn parse_predicate_value(value: &str) -> ProofTemplateResult<PredicateValue> {
    value.trim().parse::<PredicateValue>().map_err(|err| {
        ProofTemplateError::from(err).map(
            ProofTemplateErrorKind::InvalidConditionValue,
            format!("Predicate value `{}` is not a 32 bit integer", value),
        )
    })
}

/// Maps condition tokens onto operators. Callers may register aliases for
/// the built in operators.
#[derive(Clone, Debug)]
pub struct OperatorRegistry {
    operators: HashMap<String, ConditionOperator>,
}

impl OperatorRegistry {
    pub fn empty() -> Self {
        Self {
            operators: HashMap::new(),
        }
    }

    /// Inserts or overwrites. Returns the operator previously bound to the
    /// token.
    pub fn register(
        &mut self,
        token: impl Into<String>,
        operator: ConditionOperator,
    ) -> Option<ConditionOperator> {
        self.operators.insert(token.into(), operator)
    }

    /// Returns false when the token was already bound.
    pub fn register_if_absent(&mut self, token: impl Into<String>, operator: ConditionOperator) -> bool {
        let token = token.into();
        if self.operators.contains_key(&token) {
            return false;
        }
        self.operators.insert(token, operator);
        true
    }

    pub fn resolve(&self, token: &str) -> Option<ConditionOperator> {
        self.operators.get(token).copied()
    }

    /// Registered tokens in lexical order.
    pub fn known_operator_tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(EQUALS, ConditionOperator::Equals);
        for p_type in [
            PredicateTypes::LT,
            PredicateTypes::LE,
            PredicateTypes::GT,
            PredicateTypes::GE,
        ] {
            registry.register(p_type.as_token(), ConditionOperator::Relational(p_type));
        }
        registry.register(ISSUED_BY, ConditionOperator::IssuedBy);
        registry.register(SCHEMA_ID, ConditionOperator::SchemaId);
        registry.register(NON_REVOKED, ConditionOperator::NonRevoked);
        registry
    }
}

/// Operators a template author can put on an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueOperator {
    Equals,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
}

impl ValueOperator {
    pub const ALL: [ValueOperator; 5] = [
        Self::Equals,
        Self::LessThan,
        Self::LessThanOrEqualTo,
        Self::GreaterThan,
        Self::GreaterThanOrEqualTo,
    ];

    pub fn token(&self) -> &'static str {
        match self.predicate_type() {
            Some(p_type) => p_type.as_token(),
            None => EQUALS,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Equals => {
                "Compares the attributes value with the given value for equality. This reveals the value."
            }
            Self::LessThan => {
                "True, if the attributes value is less than given. Do not reveal the value."
            }
            Self::LessThanOrEqualTo => {
                "True, if the attributes value is less than or equal given. Do not reveal the value."
            }
            Self::GreaterThan => {
                "True, if the attributes value is greater than given. Do not reveal the value."
            }
            Self::GreaterThanOrEqualTo => {
                "True, if the attributes value is greater than or equal given. Do not reveal the value."
            }
        }
    }

    pub fn handle_as_predicate(&self) -> bool {
        self.predicate_type().is_some()
    }

    pub fn predicate_type(&self) -> Option<PredicateTypes> {
        match self {
            Self::Equals => None,
            Self::LessThan => Some(PredicateTypes::LT),
            Self::LessThanOrEqualTo => Some(PredicateTypes::LE),
            Self::GreaterThan => Some(PredicateTypes::GT),
            Self::GreaterThanOrEqualTo => Some(PredicateTypes::GE),
        }
    }

    pub fn condition_value_is_valid(&self, value: &str) -> bool {
        !self.handle_as_predicate() || value.trim().parse::<PredicateValue>().is_ok()
    }

    pub fn from_predicate_type(p_type: PredicateTypes) -> Self {
        match p_type {
            PredicateTypes::GE => Self::GreaterThanOrEqualTo,
            PredicateTypes::LE => Self::LessThanOrEqualTo,
            PredicateTypes::GT => Self::GreaterThan,
            PredicateTypes::LT => Self::LessThan,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operator| operator.token() == token)
    }
}

/// Value operators usable with templates of the given credential type.
pub fn known_condition_operators(credential_type: CredentialType) -> Vec<ValueOperator> {
    match credential_type {
        CredentialType::Indy => ValueOperator::ALL.to_vec(),
        CredentialType::JsonLd => vec![ValueOperator::Equals],
    }
}
