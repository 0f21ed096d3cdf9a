use serde::de::DeserializeOwned;

use crate::errors::error::{TestUtilsError, TestUtilsResult};

/// Parses a JSON fixture, naming it in the error so failing tests point at
/// the broken fixture.
pub fn load_fixture<T>(name: &str, json: &str) -> TestUtilsResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(json).map_err(|source| TestUtilsError::FixtureError {
        name: name.to_string(),
        source,
    })
}

/// Template using two schemas with conditions, restrictions and revocation.
pub const TWO_SCHEMA_TEMPLATE: &str = r#"{
    "name": "Company onboarding",
    "type": "INDY",
    "attributeGroups": [
        {
            "schemaId": "5c1a8b7e-2f0d-4d8e-9c53-0c7f2d1b6a41",
            "nonRevoked": true,
            "attributes": [
                { "name": "iban" },
                { "name": "balance", "conditions": [{ "operator": ">=", "value": "100" }] }
            ]
        },
        {
            "schemaId": "a0f3c96e-7a55-4b65-8a0b-7d3c0f6b2e19",
            "schemaLevelRestrictions": [
                { "issuerDid": "did:sov:M6Mbe3qx7vB4wpZF4sBRjt" },
                { "issuerDid": "Th7MpTaRZVRYnPiabds81Y" }
            ],
            "attributes": [
                { "name": "name", "conditions": [{ "operator": "==", "value": "ACME" }] },
                { "name": "city" }
            ]
        }
    ]
}"#;
