use std::collections::HashSet;

use crate::{
    conversion::SchemaResolver,
    data_types::{
        pres_request::PredicateValue,
        template::{AttributeGroup, CredentialType, ProofTemplate, ValueCondition},
    },
    errors::error::prelude::*,
    operators::{known_condition_operators, ConditionOperator, OperatorRegistry},
};

pub trait Validatable {
    fn validate(&self) -> ProofTemplateResult<()>;
}

macro_rules! invalid {
    ($($arg:tt)+) => {
        ProofTemplateError::from_msg(ProofTemplateErrorKind::InvalidTemplate, format!($($arg)+))
    };
}

impl Validatable for ProofTemplate {
    fn validate(&self) -> ProofTemplateResult<()> {
        validate_with_operators(self, &OperatorRegistry::default())
    }
}

/// Structural validation of a template against the operators a caller has
/// registered.
pub fn validate_with_operators(
    template: &ProofTemplate,
    operators: &OperatorRegistry,
) -> ProofTemplateResult<()> {
    if template.name.trim().is_empty() {
        return Err(invalid!("Proof template validation failed: name is empty"));
    }
    if template.attribute_groups.is_empty() {
        return Err(invalid!(
            "Proof template validation failed: {} has no attribute groups",
            template.name
        ));
    }
    for group in template.attribute_groups() {
        validate_group(group, template.credential_type, operators)?;
    }
    Ok(())
}

fn validate_group(
    group: &AttributeGroup,
    credential_type: CredentialType,
    operators: &OperatorRegistry,
) -> ProofTemplateResult<()> {
    if group.schema_id.trim().is_empty() {
        return Err(invalid!(
            "Proof template validation failed: attribute group without schema"
        ));
    }
    let mut unique = HashSet::new();
    for attribute in &group.attributes {
        let name = attribute.name.trim();
        if name.is_empty() {
            return Err(invalid!(
                "Proof template validation failed: schema {} has an attribute without name",
                group.schema_id
            ));
        }
        if !unique.insert(name) {
            return Err(invalid!(
                "Proof template validation failed: attribute {} is requested twice from schema {}",
                name,
                group.schema_id
            ));
        }
        for condition in &attribute.conditions {
            validate_condition(name, condition, credential_type, operators)?;
        }
    }
    Ok(())
}

fn validate_condition(
    attribute_name: &str,
    condition: &ValueCondition,
    credential_type: CredentialType,
    operators: &OperatorRegistry,
) -> ProofTemplateResult<()> {
    let operator = match credential_type {
        CredentialType::JsonLd => known_condition_operators(credential_type)
            .iter()
            .any(|operator| operator.token() == condition.operator)
            .then_some(ConditionOperator::Equals),
        CredentialType::Indy => operators.resolve(&condition.operator),
    };
    let Some(operator) = operator else {
        return Err(invalid!(
            "Proof template validation failed: operator `{}` on attribute {} is not supported for {:?} credentials",
            condition.operator,
            attribute_name,
            credential_type
        ));
    };

    let value = condition
        .value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let valid = match (operator, value) {
        (ConditionOperator::Relational(_), Some(value)) => value.parse::<PredicateValue>().is_ok(),
        (ConditionOperator::NonRevoked, Some(value)) => value.parse::<u64>().is_ok(),
        (ConditionOperator::NonRevoked, None) => true,
        (_, value) => value.is_some(),
    };
    if !valid {
        return Err(invalid!(
            "Proof template validation failed: value {:?} is not valid for `{}` on attribute {}",
            condition.value,
            condition.operator,
            attribute_name
        ));
    }
    Ok(())
}

/// Every group's schema must resolve and contain the requested attributes.
pub fn validate_against_schemas<S>(template: &ProofTemplate, schemas: &S) -> ProofTemplateResult<()>
where
    S: SchemaResolver + ?Sized,
{
    for group in template.attribute_groups() {
        let schema = schemas.get_schema(&group.schema_id).ok_or_else(|| {
            ProofTemplateError::from_msg(
                ProofTemplateErrorKind::SchemaNotFound,
                format!("Schema {} could not be resolved", group.schema_id),
            )
        })?;
        if let Some(unknown) = group
            .attribute_names()
            .find(|name| !schema.attribute_names.iter().any(|known| known == name.trim()))
        {
            return Err(ProofTemplateError::from_msg(
                ProofTemplateErrorKind::UnknownSchemaAttribute,
                format!(
                    "Attribute {} is not part of schema {}",
                    unknown, schema.ledger_schema_id
                ),
            ));
        }
    }
    Ok(())
}
