use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialType {
    /// Ledger based anoncreds credential
    #[default]
    Indy,
    /// W3C document based credential
    JsonLd,
}

/// A named definition of what a partner is asked to prove.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ProofTemplate {
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[builder(setter(into))]
    pub name: String,
    #[builder(default)]
    #[serde(default, rename = "type")]
    pub credential_type: CredentialType,
    #[builder(default)]
    #[serde(default)]
    pub attribute_groups: Vec<AttributeGroup>,
}

impl ProofTemplate {
    pub fn attribute_groups(&self) -> impl Iterator<Item = &AttributeGroup> {
        self.attribute_groups.iter()
    }

    pub fn is_indy(&self) -> bool {
        self.credential_type == CredentialType::Indy
    }

    pub fn is_json_ld(&self) -> bool {
        self.credential_type == CredentialType::JsonLd
    }
}

/// Attributes that have to be proven from one credential of the same schema.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct AttributeGroup {
    #[builder(setter(into))]
    pub schema_id: String,
    #[builder(default)]
    #[serde(default)]
    pub non_revoked: bool,
    #[builder(default)]
    #[serde(default)]
    pub schema_level_restrictions: Vec<SchemaRestrictions>,
    #[builder(default)]
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl AttributeGroup {
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|attribute| attribute.name.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]
pub struct Attribute {
    #[builder(setter(into))]
    pub name: String,
    #[builder(default)]
    #[serde(default)]
    pub conditions: Vec<ValueCondition>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: ValueCondition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// A single constraint on an attribute value. The operator is kept as the raw
/// token so that templates written against unknown operators still load.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValueCondition {
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValueCondition {
    pub fn new(operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            value: Some(value.into()),
        }
    }

    pub fn without_value(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            value: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default, setter(strip_option, into)))]
pub struct SchemaRestrictions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_issuer_did: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_definition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_did: Option<String>,
}

impl SchemaRestrictions {
    /// Blank values become absent and DID values keep their unqualified last
    /// segment, so `did:sov:Th7MpTaRZVRYnPiabds81Y` and `Th7MpTaRZVRYnPiabds81Y`
    /// restrict the same issuer.
    pub fn normalized(&self) -> Self {
        Self {
            schema_id: trim_to_none(self.schema_id.as_deref()),
            schema_name: trim_to_none(self.schema_name.as_deref()),
            schema_version: trim_to_none(self.schema_version.as_deref()),
            schema_issuer_did: last_segment_or_none(self.schema_issuer_did.as_deref()),
            credential_definition_id: trim_to_none(self.credential_definition_id.as_deref()),
            issuer_did: last_segment_or_none(self.issuer_did.as_deref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn trim_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn last_segment_or_none(value: Option<&str>) -> Option<String> {
    trim_to_none(value).and_then(|value| {
        value
            .rsplit(':')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned)
    })
}

#[cfg(test)]
mod unit_tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalized_strips_did_prefix_and_blanks() {
        let restrictions = SchemaRestrictions::builder()
            .schema_name("  ")
            .schema_version(" 1.0 ")
            .issuer_did("did:sov:Th7MpTaRZVRYnPiabds81Y")
            .schema_issuer_did("did:indy:sovrin:")
            .build();

        let normalized = restrictions.normalized();

        assert_eq!(normalized.schema_name, None);
        assert_eq!(normalized.schema_version.as_deref(), Some("1.0"));
        assert_eq!(
            normalized.issuer_did.as_deref(),
            Some("Th7MpTaRZVRYnPiabds81Y")
        );
        assert_eq!(normalized.schema_issuer_did, None);
    }

    #[test]
    fn test_template_deserializes_from_camel_case() {
        let template: ProofTemplate = serde_json::from_value(json!({
            "name": "Bank Account",
            "attributeGroups": [{
                "schemaId": "c1f9b4a2-0000-4000-8000-000000000001",
                "nonRevoked": true,
                "schemaLevelRestrictions": [{ "issuerDid": "did:sov:issuer" }],
                "attributes": [
                    { "name": "iban" },
                    { "name": "balance", "conditions": [{ "operator": ">=", "value": "100" }] }
                ]
            }]
        }))
        .unwrap();

        assert!(template.is_indy());
        let group = template.attribute_groups().next().unwrap();
        assert!(group.non_revoked);
        assert_eq!(
            group.attribute_names().collect::<Vec<_>>(),
            vec!["iban", "balance"]
        );
        assert_eq!(
            group.attributes[1].conditions,
            vec![ValueCondition::new(">=", "100")]
        );
    }
}
