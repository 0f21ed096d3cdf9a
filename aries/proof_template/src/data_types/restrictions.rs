use std::collections::BTreeMap;

use serde::{
    de,
    ser::{SerializeMap, Serializer},
    Deserialize, Deserializer, Serialize,
};
use serde_json::{Map, Value};

use super::template::SchemaRestrictions;

const ATTRIBUTE_VALUE_PREFIX: &str = "attr::";
const ATTRIBUTE_VALUE_SUFFIX: &str = "::value";

/// One restriction set of a requested attribute or predicate. All fields are
/// a conjunction; several sets on one item are alternatives.
///
/// Attribute value equalities are flattened into `attr::<name>::value` keys
/// on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProofRestrictions {
    pub schema_id: Option<String>,
    pub schema_name: Option<String>,
    pub schema_version: Option<String>,
    pub schema_issuer_did: Option<String>,
    pub cred_def_id: Option<String>,
    pub issuer_did: Option<String>,
    pub attribute_values: BTreeMap<String, String>,
}

impl ProofRestrictions {
    pub fn for_schema(schema_id: impl Into<String>) -> Self {
        Self {
            schema_id: Some(schema_id.into()),
            ..Self::default()
        }
    }

    pub fn add_attribute_value_restriction(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.attribute_values.insert(name.into(), value.into());
        self
    }

    /// Conjunction of `self` and `other`. Fields set on `other` win, equality
    /// constraints are united.
    pub fn merged_with(&self, other: &ProofRestrictions) -> ProofRestrictions {
        let mut attribute_values = self.attribute_values.clone();
        attribute_values.extend(
            other
                .attribute_values
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        ProofRestrictions {
            schema_id: other.schema_id.clone().or_else(|| self.schema_id.clone()),
            schema_name: other
                .schema_name
                .clone()
                .or_else(|| self.schema_name.clone()),
            schema_version: other
                .schema_version
                .clone()
                .or_else(|| self.schema_version.clone()),
            schema_issuer_did: other
                .schema_issuer_did
                .clone()
                .or_else(|| self.schema_issuer_did.clone()),
            cred_def_id: other
                .cred_def_id
                .clone()
                .or_else(|| self.cred_def_id.clone()),
            issuer_did: other.issuer_did.clone().or_else(|| self.issuer_did.clone()),
            attribute_values,
        }
    }

    /// The restriction without its attribute value equalities, expressed as
    /// template schema restrictions.
    pub fn to_schema_restrictions(&self) -> SchemaRestrictions {
        SchemaRestrictions {
            schema_id: self.schema_id.clone(),
            schema_name: self.schema_name.clone(),
            schema_version: self.schema_version.clone(),
            schema_issuer_did: self.schema_issuer_did.clone(),
            credential_definition_id: self.cred_def_id.clone(),
            issuer_did: self.issuer_did.clone(),
        }
    }

    fn fields(&self) -> [(&'static str, Option<&String>); 6] {
        [
            ("schema_id", self.schema_id.as_ref()),
            ("schema_name", self.schema_name.as_ref()),
            ("schema_version", self.schema_version.as_ref()),
            ("schema_issuer_did", self.schema_issuer_did.as_ref()),
            ("cred_def_id", self.cred_def_id.as_ref()),
            ("issuer_did", self.issuer_did.as_ref()),
        ]
    }
}

impl From<&SchemaRestrictions> for ProofRestrictions {
    fn from(restrictions: &SchemaRestrictions) -> Self {
        ProofRestrictions {
            schema_id: restrictions.schema_id.clone(),
            schema_name: restrictions.schema_name.clone(),
            schema_version: restrictions.schema_version.clone(),
            schema_issuer_did: restrictions.schema_issuer_did.clone(),
            cred_def_id: restrictions.credential_definition_id.clone(),
            issuer_did: restrictions.issuer_did.clone(),
            attribute_values: BTreeMap::new(),
        }
    }
}

fn attribute_value_key(name: &str) -> String {
    format!("{ATTRIBUTE_VALUE_PREFIX}{name}{ATTRIBUTE_VALUE_SUFFIX}")
}

fn attribute_name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(ATTRIBUTE_VALUE_PREFIX)?
        .strip_suffix(ATTRIBUTE_VALUE_SUFFIX)
        .filter(|name| !name.is_empty())
}

impl Serialize for ProofRestrictions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let present = self.fields().into_iter().filter(|(_, v)| v.is_some());
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in present {
            map.serialize_entry(key, &value)?;
        }
        for (name, value) in &self.attribute_values {
            map.serialize_entry(&attribute_value_key(name), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProofRestrictions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let mut restrictions = ProofRestrictions::default();

        for (key, value) in map {
            let value = match value {
                Value::String(value) => value,
                other => {
                    return Err(de::Error::custom(format!(
                        "restriction `{key}` must be a string, got {other}"
                    )))
                }
            };
            match key.as_str() {
                "schema_id" => restrictions.schema_id = Some(value),
                "schema_name" => restrictions.schema_name = Some(value),
                "schema_version" => restrictions.schema_version = Some(value),
                "schema_issuer_did" => restrictions.schema_issuer_did = Some(value),
                "cred_def_id" => restrictions.cred_def_id = Some(value),
                "issuer_did" => restrictions.issuer_did = Some(value),
                other => match attribute_name_from_key(other) {
                    Some(name) => {
                        restrictions.add_attribute_value_restriction(name, value);
                    }
                    None => warn!("Ignoring unsupported proof restriction `{}`", other),
                },
            }
        }
        Ok(restrictions)
    }
}
