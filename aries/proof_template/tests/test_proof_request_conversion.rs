use mockall::{mock, predicate::eq};
use proof_template::{
    data_types::{
        pres_request::PredicateTypes,
        template::{Attribute, AttributeGroup, ProofTemplate, SchemaRestrictions, ValueCondition},
    },
    operators::ConditionOperator,
    FixedClock, Partner, PartnerRepository, ProofTemplateConfig, ProofTemplateConversion,
    ProofTemplateErrorKind, SchemaInfo, SchemaResolver,
};
use serde_json::json;
use test_utils::{
    constants::{
        BANK_ACCOUNT_ATTRIBUTES, BANK_ACCOUNT_SCHEMA_ID, BANK_ACCOUNT_SCHEMA_REF,
        COMMERCIAL_REGISTER_ATTRIBUTES, COMMERCIAL_REGISTER_SCHEMA_ID,
        COMMERCIAL_REGISTER_SCHEMA_REF, CONNECTION_ID, FIXED_CLOCK_MILLIS, FIXED_CLOCK_SECONDS,
        ISSUER_DID, OTHER_ISSUER_DID, QUALIFIED_ISSUER_DID, UNKNOWN_SCHEMA_REF,
    },
    fixtures::{load_fixture, TWO_SCHEMA_TEMPLATE},
    logger::init_logger,
};
use uuid::Uuid;

mock! {
    pub Schemas {}
    impl SchemaResolver for Schemas {
        fn get_schema(&self, local_schema_ref: &str) -> Option<SchemaInfo>;
    }
}

mock! {
    pub Partners {}
    impl PartnerRepository for Partners {
        fn find_by_id(&self, partner_id: &Uuid) -> Option<Partner>;
    }
}

fn schema_info(local_schema_ref: &str) -> Option<SchemaInfo> {
    let (ledger_schema_id, attribute_names) = match local_schema_ref {
        BANK_ACCOUNT_SCHEMA_REF => (BANK_ACCOUNT_SCHEMA_ID, BANK_ACCOUNT_ATTRIBUTES),
        COMMERCIAL_REGISTER_SCHEMA_REF => {
            (COMMERCIAL_REGISTER_SCHEMA_ID, COMMERCIAL_REGISTER_ATTRIBUTES)
        }
        _ => return None,
    };
    Some(
        SchemaInfo::builder()
            .ledger_schema_id(ledger_schema_id)
            .attribute_names(attribute_names.iter().map(ToString::to_string).collect())
            .build(),
    )
}

fn schemas() -> MockSchemas {
    let mut schemas = MockSchemas::new();
    schemas
        .expect_get_schema()
        .returning(schema_info);
    schemas
}

fn partners(partner_id: Uuid) -> MockPartners {
    let mut partners = MockPartners::new();
    partners
        .expect_find_by_id()
        .with(eq(partner_id))
        .returning(|partner_id| {
            Some(Partner {
                id: *partner_id,
                connection_id: Some(CONNECTION_ID.to_string()),
            })
        });
    partners
}

fn conversion_with(
    schemas: MockSchemas,
    partners: MockPartners,
    config: ProofTemplateConfig,
) -> ProofTemplateConversion<MockSchemas, MockPartners, FixedClock> {
    init_logger();
    let clock = FixedClock::from_millis(FIXED_CLOCK_MILLIS).unwrap();
    ProofTemplateConversion::new(schemas, partners, clock, config)
}

fn conversion(partner_id: Uuid) -> ProofTemplateConversion<MockSchemas, MockPartners, FixedClock> {
    conversion_with(schemas(), partners(partner_id), ProofTemplateConfig::default())
}

fn template(groups: Vec<AttributeGroup>) -> ProofTemplate {
    ProofTemplate::builder()
        .name("Company onboarding")
        .attribute_groups(groups)
        .build()
}

fn group(local_schema_ref: &str, attributes: Vec<Attribute>) -> AttributeGroup {
    AttributeGroup::builder()
        .schema_id(local_schema_ref)
        .attributes(attributes)
        .build()
}

#[test]
fn test_single_plain_attribute() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![group(
        BANK_ACCOUNT_SCHEMA_REF,
        vec![Attribute::new("iban")],
    )]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap();

    assert!(request.warnings.is_empty());
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "connection_id": CONNECTION_ID,
            "proof_request": {
                "name": "Company onboarding",
                "version": "1.0",
                "requested_attributes": {
                    BANK_ACCOUNT_SCHEMA_ID: {
                        "names": ["iban"],
                        "restrictions": [{ "schema_id": BANK_ACCOUNT_SCHEMA_ID }]
                    }
                },
                "requested_predicates": {}
            }
        })
    );
}

#[test]
fn test_two_schemas_keep_independent_restrictions() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![
        group(BANK_ACCOUNT_SCHEMA_REF, vec![Attribute::new("iban")]),
        AttributeGroup::builder()
            .schema_id(COMMERCIAL_REGISTER_SCHEMA_REF)
            .schema_level_restrictions(vec![SchemaRestrictions::builder()
                .issuer_did(OTHER_ISSUER_DID)
                .build()])
            .attributes(vec![Attribute::new("city")])
            .build(),
    ]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap()
        .proof_request;

    assert_eq!(
        serde_json::to_value(&request.requested_attributes).unwrap(),
        json!({
            BANK_ACCOUNT_SCHEMA_ID: {
                "names": ["iban"],
                "restrictions": [{ "schema_id": BANK_ACCOUNT_SCHEMA_ID }]
            },
            COMMERCIAL_REGISTER_SCHEMA_ID: {
                "names": ["city"],
                "restrictions": [{
                    "schema_id": COMMERCIAL_REGISTER_SCHEMA_ID,
                    "issuer_did": OTHER_ISSUER_DID
                }]
            }
        })
    );
}

#[test]
fn test_equals_condition_restricts_value() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![group(
        COMMERCIAL_REGISTER_SCHEMA_REF,
        vec![Attribute::new("name").with_condition(ValueCondition::new("==", "ACME"))],
    )]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap()
        .proof_request;

    assert_eq!(
        serde_json::to_value(&request.requested_attributes[COMMERCIAL_REGISTER_SCHEMA_ID])
            .unwrap(),
        json!({
            "names": ["name"],
            "restrictions": [{
                "schema_id": COMMERCIAL_REGISTER_SCHEMA_ID,
                "attr::name::value": "ACME"
            }]
        })
    );
}

#[test]
fn test_relational_condition_becomes_predicate() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![group(
        COMMERCIAL_REGISTER_SCHEMA_REF,
        vec![
            Attribute::new("secret1").with_condition(ValueCondition::new(">=", "10")),
            Attribute::new("city"),
        ],
    )]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap()
        .proof_request;

    assert_eq!(
        request.requested_attributes[COMMERCIAL_REGISTER_SCHEMA_ID].names,
        Some(vec!["city".to_string()])
    );
    assert_eq!(request.requested_predicates.len(), 1);
    let predicate = request.requested_predicates.values().next().unwrap();
    assert_eq!(predicate.name, "secret1");
    assert_eq!(predicate.p_type, PredicateTypes::GE);
    assert_eq!(predicate.p_value, 10);
    assert_eq!(
        predicate.restrictions[0].schema_id.as_deref(),
        Some(COMMERCIAL_REGISTER_SCHEMA_ID)
    );
}

#[test]
fn test_non_revoked_group_uses_clock_for_every_item() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![AttributeGroup::builder()
        .schema_id(BANK_ACCOUNT_SCHEMA_REF)
        .non_revoked(true)
        .attributes(vec![
            Attribute::new("iban"),
            Attribute::new("balance").with_condition(ValueCondition::new("<", "1000")),
        ])
        .build()]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap()
        .proof_request;

    let expected = json!({ "from": FIXED_CLOCK_SECONDS, "to": FIXED_CLOCK_SECONDS });
    assert_eq!(
        serde_json::to_value(request.requested_attributes[BANK_ACCOUNT_SCHEMA_ID].non_revoked)
            .unwrap(),
        expected
    );
    for predicate in request.requested_predicates.values() {
        assert_eq!(serde_json::to_value(predicate.non_revoked).unwrap(), expected);
    }
}

#[test]
fn test_schema_level_alternatives_on_every_item() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![AttributeGroup::builder()
        .schema_id(COMMERCIAL_REGISTER_SCHEMA_REF)
        .schema_level_restrictions(vec![
            SchemaRestrictions::builder()
                .issuer_did(QUALIFIED_ISSUER_DID)
                .build(),
            SchemaRestrictions::builder().issuer_did(OTHER_ISSUER_DID).build(),
        ])
        .attributes(vec![
            Attribute::new("name").with_condition(ValueCondition::new("==", "ACME")),
            Attribute::new("secret1").with_condition(ValueCondition::new(">", "0")),
        ])
        .build()]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap()
        .proof_request;

    let expected = json!([
        {
            "schema_id": COMMERCIAL_REGISTER_SCHEMA_ID,
            "issuer_did": ISSUER_DID,
            "attr::name::value": "ACME"
        },
        {
            "schema_id": COMMERCIAL_REGISTER_SCHEMA_ID,
            "issuer_did": OTHER_ISSUER_DID,
            "attr::name::value": "ACME"
        }
    ]);
    assert_eq!(
        serde_json::to_value(&request.requested_attributes[COMMERCIAL_REGISTER_SCHEMA_ID].restrictions)
            .unwrap(),
        expected
    );
    for predicate in request.requested_predicates.values() {
        assert_eq!(serde_json::to_value(&predicate.restrictions).unwrap(), expected);
    }
}

#[test]
fn test_compilation_is_deterministic() {
    let partner_id = Uuid::new_v4();
    let template: ProofTemplate = load_fixture("two schema template", TWO_SCHEMA_TEMPLATE).unwrap();
    let conversion = conversion(partner_id);

    let first = conversion.proof_request_from(&partner_id, &template).unwrap();
    let second = conversion.proof_request_from(&partner_id, &template).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_two_schema_fixture() {
    let partner_id = Uuid::new_v4();
    let template: ProofTemplate = load_fixture("two schema template", TWO_SCHEMA_TEMPLATE).unwrap();
    let balance_referent = format!("{BANK_ACCOUNT_SCHEMA_ID}/balance/GE");

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap();

    assert_eq!(
        serde_json::to_value(&request.proof_request).unwrap(),
        json!({
            "name": "Company onboarding",
            "version": "1.0",
            "requested_attributes": {
                BANK_ACCOUNT_SCHEMA_ID: {
                    "names": ["iban"],
                    "restrictions": [{ "schema_id": BANK_ACCOUNT_SCHEMA_ID }],
                    "non_revoked": { "from": FIXED_CLOCK_SECONDS, "to": FIXED_CLOCK_SECONDS }
                },
                COMMERCIAL_REGISTER_SCHEMA_ID: {
                    "names": ["name", "city"],
                    "restrictions": [
                        {
                            "schema_id": COMMERCIAL_REGISTER_SCHEMA_ID,
                            "issuer_did": ISSUER_DID,
                            "attr::name::value": "ACME"
                        },
                        {
                            "schema_id": COMMERCIAL_REGISTER_SCHEMA_ID,
                            "issuer_did": OTHER_ISSUER_DID,
                            "attr::name::value": "ACME"
                        }
                    ]
                }
            },
            "requested_predicates": {
                balance_referent: {
                    "name": "balance",
                    "p_type": ">=",
                    "p_value": 100,
                    "restrictions": [{ "schema_id": BANK_ACCOUNT_SCHEMA_ID }],
                    "non_revoked": { "from": FIXED_CLOCK_SECONDS, "to": FIXED_CLOCK_SECONDS }
                }
            }
        })
    );
}

#[test]
fn test_unresolvable_schema_skips_group() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![
        group(UNKNOWN_SCHEMA_REF, vec![Attribute::new("ghost")]),
        group(BANK_ACCOUNT_SCHEMA_REF, vec![Attribute::new("iban")]),
    ]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap();

    assert_eq!(
        request
            .proof_request
            .requested_attributes
            .keys()
            .collect::<Vec<_>>(),
        vec![BANK_ACCOUNT_SCHEMA_ID]
    );
    assert_eq!(request.warnings.len(), 1);
    assert_eq!(request.warnings[0].kind, ProofTemplateErrorKind::SchemaNotFound);
}

#[test]
fn test_schema_resolved_once_per_group() {
    let partner_id = Uuid::new_v4();
    let mut schemas = MockSchemas::new();
    schemas
        .expect_get_schema()
        .with(eq(BANK_ACCOUNT_SCHEMA_REF))
        .times(1)
        .returning(schema_info);
    let template = template(vec![group(
        BANK_ACCOUNT_SCHEMA_REF,
        vec![Attribute::new("iban"), Attribute::new("bic"), Attribute::new("balance")],
    )]);

    let request = conversion_with(schemas, partners(partner_id), ProofTemplateConfig::default())
        .proof_request_from(&partner_id, &template)
        .unwrap();

    assert_eq!(
        request.proof_request.requested_attributes[BANK_ACCOUNT_SCHEMA_ID].names,
        Some(vec!["iban".to_string(), "bic".to_string(), "balance".to_string()])
    );
}

#[test]
fn test_unknown_partner() {
    let mut partners = MockPartners::new();
    partners.expect_find_by_id().returning(|_| None);
    let template = template(vec![group(BANK_ACCOUNT_SCHEMA_REF, vec![Attribute::new("iban")])]);

    let err = conversion_with(schemas(), partners, ProofTemplateConfig::default())
        .proof_request_from(&Uuid::new_v4(), &template)
        .unwrap_err();

    assert_eq!(err.kind(), ProofTemplateErrorKind::PartnerNotFound);
}

#[test]
fn test_partner_without_connection() {
    let mut partners = MockPartners::new();
    partners.expect_find_by_id().returning(|partner_id| {
        Some(Partner {
            id: *partner_id,
            connection_id: None,
        })
    });
    let template = template(vec![group(BANK_ACCOUNT_SCHEMA_REF, vec![Attribute::new("iban")])]);

    let err = conversion_with(schemas(), partners, ProofTemplateConfig::default())
        .proof_request_from(&Uuid::new_v4(), &template)
        .unwrap_err();

    assert_eq!(err.kind(), ProofTemplateErrorKind::PartnerHasNoConnection);
}

#[test]
fn test_template_without_groups() {
    let partner_id = Uuid::new_v4();

    let err = conversion(partner_id)
        .proof_request_from(&partner_id, &template(Vec::new()))
        .unwrap_err();

    assert_eq!(err.kind(), ProofTemplateErrorKind::InvalidTemplate);
}

#[test]
fn test_last_write_wins_collapses_range() {
    let partner_id = Uuid::new_v4();
    let config =
        ProofTemplateConfig::from_json(r#"{ "version": "2.0", "repeated_predicates": "last_write_wins" }"#)
            .unwrap();
    let template = template(vec![group(
        COMMERCIAL_REGISTER_SCHEMA_REF,
        vec![Attribute::new("secret1")
            .with_condition(ValueCondition::new(">=", "5"))
            .with_condition(ValueCondition::new("<", "10"))],
    )]);

    let request = conversion_with(schemas(), partners(partner_id), config)
        .proof_request_from(&partner_id, &template)
        .unwrap()
        .proof_request;

    assert_eq!(request.version, "2.0");
    assert_eq!(request.requested_predicates.len(), 1);
    let predicate = request.requested_predicates.values().next().unwrap();
    assert_eq!((predicate.p_type, predicate.p_value), (PredicateTypes::LT, 10));
}

#[test]
fn test_separate_predicates_request_range() {
    let partner_id = Uuid::new_v4();
    let template = template(vec![group(
        COMMERCIAL_REGISTER_SCHEMA_REF,
        vec![Attribute::new("secret1")
            .with_condition(ValueCondition::new(">=", "5"))
            .with_condition(ValueCondition::new("<", "10"))],
    )]);

    let request = conversion(partner_id)
        .proof_request_from(&partner_id, &template)
        .unwrap()
        .proof_request;

    assert_eq!(
        request.requested_predicates.keys().collect::<Vec<_>>(),
        vec![
            &format!("{COMMERCIAL_REGISTER_SCHEMA_ID}/secret1/GE"),
            &format!("{COMMERCIAL_REGISTER_SCHEMA_ID}/secret1/LT"),
        ]
    );
}

#[test]
fn test_registered_alias_is_applied() {
    let partner_id = Uuid::new_v4();
    let mut conversion = conversion(partner_id);
    conversion
        .operators_mut()
        .register_if_absent("at-least", ConditionOperator::Relational(PredicateTypes::GE));
    let template = template(vec![group(
        COMMERCIAL_REGISTER_SCHEMA_REF,
        vec![
            Attribute::new("secret1").with_condition(ValueCondition::new("at-least", "3")),
            Attribute::new("city").with_condition(ValueCondition::new("~=", "Berlin")),
        ],
    )]);

    let request = conversion.proof_request_from(&partner_id, &template).unwrap();

    assert_eq!(request.proof_request.requested_predicates.len(), 1);
    assert_eq!(
        request.proof_request.requested_attributes[COMMERCIAL_REGISTER_SCHEMA_ID].names,
        Some(vec!["city".to_string()])
    );
    assert_eq!(request.warnings.len(), 1);
    assert_eq!(request.warnings[0].kind, ProofTemplateErrorKind::UnknownOperator);
}
