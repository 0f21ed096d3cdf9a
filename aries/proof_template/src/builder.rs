use std::collections::BTreeMap;

use crate::{
    config::RepeatedPredicatePolicy,
    data_types::{
        pres_request::{
            NonRevokedInterval, PredicateTypes, PredicateValue, RequestedAttributes,
            RequestedPredicates,
        },
        restrictions::ProofRestrictions,
        template::SchemaRestrictions,
    },
};

/// Target of a restriction mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestrictionScope<'a> {
    /// Every schema level alternative of the builder.
    Schema,
    /// Constraints contributed by one attribute's conditions.
    Attribute(&'a str),
}

impl<'a> From<Option<&'a str>> for RestrictionScope<'a> {
    fn from(attribute_name: Option<&'a str>) -> Self {
        attribute_name.map_or(Self::Schema, Self::Attribute)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingPredicate {
    name: String,
    p_type: PredicateTypes,
    p_value: PredicateValue,
}

/// Accumulates everything requested from credentials of one ledger schema.
#[derive(Clone, Debug)]
pub struct SchemaRequestBuilder {
    schema_id: String,
    predicate_policy: RepeatedPredicatePolicy,
    attribute_names: Vec<String>,
    predicates: Vec<PendingPredicate>,
    schema_restrictions: Vec<ProofRestrictions>,
    implicit_schema_restriction: bool,
    attribute_restrictions: BTreeMap<String, ProofRestrictions>,
    non_revoked: Option<NonRevokedInterval>,
}

impl SchemaRequestBuilder {
    pub fn new(schema_id: impl Into<String>, predicate_policy: RepeatedPredicatePolicy) -> Self {
        let schema_id = schema_id.into();
        Self {
            schema_restrictions: vec![ProofRestrictions::for_schema(schema_id.clone())],
            schema_id,
            predicate_policy,
            attribute_names: Vec::new(),
            predicates: Vec::new(),
            implicit_schema_restriction: true,
            attribute_restrictions: BTreeMap::new(),
            non_revoked: None,
        }
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Adds explicit schema level alternatives. The first explicit set
    /// replaces the implicit "schema id only" restriction.
    pub fn add_schema_level_restrictions(&mut self, restrictions: &[SchemaRestrictions]) {
        let explicit: Vec<ProofRestrictions> = restrictions
            .iter()
            .map(SchemaRestrictions::normalized)
            .filter(|restriction| !restriction.is_empty())
            .map(|restriction| ProofRestrictions::from(&restriction))
            .collect();
        if explicit.is_empty() {
            return;
        }
        if self.implicit_schema_restriction {
            self.schema_restrictions.clear();
            self.implicit_schema_restriction = false;
        }
        for restriction in explicit {
            if !self.schema_restrictions.contains(&restriction) {
                self.schema_restrictions.push(restriction);
            }
        }
    }

    pub fn add_attribute(&mut self, name: &str) {
        if self.is_predicate(name) || self.attribute_names.iter().any(|known| known == name) {
            return;
        }
        self.attribute_names.push(name.to_string());
    }

    pub fn add_predicate(&mut self, name: &str, p_type: PredicateTypes, p_value: PredicateValue) {
        self.attribute_names.retain(|known| known != name);
        let policy = self.predicate_policy;
        let existing = self.predicates.iter_mut().find(|predicate| {
            predicate.name == name
                && (policy == RepeatedPredicatePolicy::LastWriteWins || predicate.p_type == p_type)
        });
        match existing {
            Some(predicate) => {
                if predicate.p_type != p_type || predicate.p_value != p_value {
                    debug!(
                        "Predicate {} on schema {} overwritten: {} {} -> {} {}",
                        name, self.schema_id, predicate.p_type, predicate.p_value, p_type, p_value
                    );
                }
                predicate.p_type = p_type;
                predicate.p_value = p_value;
            }
            None => self.predicates.push(PendingPredicate {
                name: name.to_string(),
                p_type,
                p_value,
            }),
        }
    }

    pub fn is_predicate(&self, name: &str) -> bool {
        self.predicates.iter().any(|predicate| predicate.name == name)
    }

    pub fn put_restriction<F>(&mut self, scope: RestrictionScope<'_>, mut mutator: F)
    where
        F: FnMut(&mut ProofRestrictions),
    {
        match scope {
            RestrictionScope::Schema => self.schema_restrictions.iter_mut().for_each(mutator),
            RestrictionScope::Attribute(name) => mutator(
                self.attribute_restrictions
                    .entry(name.to_string())
                    .or_default(),
            ),
        }
    }

    /// The interval belongs to the schema, so it covers items registered
    /// before and after this call.
    pub fn set_non_revoked(&mut self, interval: NonRevokedInterval) {
        self.non_revoked = Some(interval);
    }

    pub fn non_revoked(&self) -> Option<NonRevokedInterval> {
        self.non_revoked
    }

    /// Schema level alternatives joined with every attribute level
    /// constraint. Each set carries the schema id.
    pub fn restrictions(&self) -> Vec<ProofRestrictions> {
        let attribute_level = self
            .attribute_restrictions
            .values()
            .fold(ProofRestrictions::default(), |joined, restriction| {
                joined.merged_with(restriction)
            });
        let mut restrictions: Vec<ProofRestrictions> = Vec::new();
        for alternative in &self.schema_restrictions {
            let mut restriction = alternative.merged_with(&attribute_level);
            restriction
                .schema_id
                .get_or_insert_with(|| self.schema_id.clone());
            if !restrictions.contains(&restriction) {
                restrictions.push(restriction);
            }
        }
        restrictions
    }

    pub fn requested_attributes(&self) -> Option<RequestedAttributes> {
        if self.attribute_names.is_empty() {
            return None;
        }
        Some(RequestedAttributes {
            name: None,
            names: Some(self.attribute_names.clone()),
            restrictions: self.restrictions(),
            non_revoked: self.non_revoked,
        })
    }

    /// Predicates together with their referent in the proof request.
    pub fn requested_predicates(&self) -> Vec<(String, RequestedPredicates)> {
        let restrictions = self.restrictions();
        self.predicates
            .iter()
            .map(|predicate| {
                let referent = format!("{}/{}/{}", self.schema_id, predicate.name, predicate.p_type);
                let requested = RequestedPredicates {
                    name: predicate.name.clone(),
                    p_type: predicate.p_type,
                    p_value: predicate.p_value,
                    restrictions: restrictions.clone(),
                    non_revoked: self.non_revoked,
                };
                (referent, requested)
            })
            .collect()
    }
}
