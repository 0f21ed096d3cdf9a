use crate::{
    data_types::{
        pres_request::{NonRevokedInterval, ProofRequest},
        restrictions::ProofRestrictions,
        template::{Attribute, AttributeGroup, ProofTemplate, SchemaRestrictions, ValueCondition},
    },
    operators::EQUALS,
};

/// Reads a proof request back as a template, one attribute group per schema.
///
/// The schema of an item is the first `schema_id` found in its restrictions,
/// falling back to the referent. Predicates become relational conditions and
/// `attr::<name>::value` restrictions become `==` conditions on the attribute
/// of the same group. Group schema ids are ledger ids, not local references.
pub fn request_to_template(proof_request: &ProofRequest) -> ProofTemplate {
    trace!(
        "request_to_template >>> name: {}, attributes: {}, predicates: {}",
        proof_request.name,
        proof_request.requested_attributes.len(),
        proof_request.requested_predicates.len()
    );
    let mut groups: Vec<AttributeGroup> = Vec::new();

    for (referent, requested) in &proof_request.requested_attributes {
        let group = group_for(&mut groups, schema_id_of(referent, &requested.restrictions));
        for name in requested.attribute_names() {
            attribute_in(group, name);
        }
        absorb_restrictions(group, &requested.restrictions);
        group.non_revoked |= is_non_revoked(requested.non_revoked, proof_request.non_revoked);
    }

    for (referent, predicate) in &proof_request.requested_predicates {
        let group = group_for(&mut groups, schema_id_of(referent, &predicate.restrictions));
        add_condition(
            attribute_in(group, &predicate.name),
            ValueCondition::new(predicate.p_type.as_token(), predicate.p_value.to_string()),
        );
        absorb_restrictions(group, &predicate.restrictions);
        group.non_revoked |= is_non_revoked(predicate.non_revoked, proof_request.non_revoked);
    }

    ProofTemplate::builder()
        .name(proof_request.name.clone())
        .attribute_groups(groups)
        .build()
}

fn schema_id_of<'a>(referent: &'a str, restrictions: &'a [ProofRestrictions]) -> &'a str {
    restrictions
        .iter()
        .find_map(|restriction| restriction.schema_id.as_deref())
        .unwrap_or(referent)
}

fn is_non_revoked(item: Option<NonRevokedInterval>, request: Option<NonRevokedInterval>) -> bool {
    item.or(request).is_some_and(|interval| interval.is_set())
}

fn group_for<'g>(groups: &'g mut Vec<AttributeGroup>, schema_id: &str) -> &'g mut AttributeGroup {
    let index = match groups.iter().position(|group| group.schema_id == schema_id) {
        Some(index) => index,
        None => {
            groups.push(AttributeGroup::builder().schema_id(schema_id).build());
            groups.len() - 1
        }
    };
    &mut groups[index]
}

fn attribute_in<'g>(group: &'g mut AttributeGroup, name: &str) -> &'g mut Attribute {
    let index = match group
        .attributes
        .iter()
        .position(|attribute| attribute.name == name)
    {
        Some(index) => index,
        None => {
            group.attributes.push(Attribute::new(name));
            group.attributes.len() - 1
        }
    };
    &mut group.attributes[index]
}

fn add_condition(attribute: &mut Attribute, condition: ValueCondition) {
    if !attribute.conditions.contains(&condition) {
        attribute.conditions.push(condition);
    }
}

fn absorb_restrictions(group: &mut AttributeGroup, restrictions: &[ProofRestrictions]) {
    let implicit = SchemaRestrictions::builder()
        .schema_id(group.schema_id.clone())
        .build();
    for restriction in restrictions {
        for (name, value) in &restriction.attribute_values {
            add_condition(attribute_in(group, name), ValueCondition::new(EQUALS, value.clone()));
        }
        let schema_level = restriction.to_schema_restrictions();
        if schema_level.is_empty()
            || schema_level == implicit
            || group.schema_level_restrictions.contains(&schema_level)
        {
            continue;
        }
        group.schema_level_restrictions.push(schema_level);
    }
}
