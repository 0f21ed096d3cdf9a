use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::{
    config::ProofTemplateConfig,
    data_types::{
        pres_request::{ConversionWarning, PresentProofRequest, ProofRequest},
        template::{AttributeGroup, ProofTemplate},
    },
    errors::error::prelude::*,
    operators::OperatorRegistry,
    reverse,
    revocation::{Clock, RevocationTimestampProvider},
    validation,
    visitor::ProofTemplateVisitor,
};

/// A schema as known to the agent's database.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]
pub struct SchemaInfo {
    #[builder(setter(into))]
    pub ledger_schema_id: String,
    #[builder(default)]
    #[serde(default)]
    pub attribute_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Partner {
    pub id: Uuid,
    #[serde(default)]
    pub connection_id: Option<String>,
}

impl Partner {
    pub fn has_connection_id(&self) -> bool {
        self.connection_id
            .as_deref()
            .is_some_and(|connection_id| !connection_id.trim().is_empty())
    }
}

/// Resolves the local schema reference of an attribute group.
pub trait SchemaResolver {
    fn get_schema(&self, local_schema_ref: &str) -> Option<SchemaInfo>;
}

pub trait PartnerRepository {
    fn find_by_id(&self, partner_id: &Uuid) -> Option<Partner>;
}

impl<T> SchemaResolver for &T
where
    T: SchemaResolver + ?Sized,
{
    fn get_schema(&self, local_schema_ref: &str) -> Option<SchemaInfo> {
        (**self).get_schema(local_schema_ref)
    }
}

impl<T> PartnerRepository for &T
where
    T: PartnerRepository + ?Sized,
{
    fn find_by_id(&self, partner_id: &Uuid) -> Option<Partner> {
        (**self).find_by_id(partner_id)
    }
}

/// Entry point that turns proof templates into proof requests for a partner.
#[derive(Debug)]
pub struct ProofTemplateConversion<S, P, C> {
    schemas: S,
    partners: P,
    clock: C,
    config: ProofTemplateConfig,
    operators: OperatorRegistry,
}

impl<S, P, C> ProofTemplateConversion<S, P, C>
where
    S: SchemaResolver,
    P: PartnerRepository,
    C: Clock,
{
    pub fn new(schemas: S, partners: P, clock: C, config: ProofTemplateConfig) -> Self {
        Self {
            schemas,
            partners,
            clock,
            config,
            operators: OperatorRegistry::default(),
        }
    }

    #[must_use]
    pub fn with_operators(mut self, operators: OperatorRegistry) -> Self {
        self.operators = operators;
        self
    }

    pub fn config(&self) -> &ProofTemplateConfig {
        &self.config
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut OperatorRegistry {
        &mut self.operators
    }

    pub fn proof_request_from(
        &self,
        partner_id: &Uuid,
        template: &ProofTemplate,
    ) -> ProofTemplateResult<PresentProofRequest> {
        trace!(
            "ProofTemplateConversion::proof_request_from >>> partner_id: {}, template: {}",
            partner_id,
            template.name
        );
        let partner = self.partners.find_by_id(partner_id).ok_or_else(|| {
            ProofTemplateError::from_msg(
                ProofTemplateErrorKind::PartnerNotFound,
                format!("Partner {} not found", partner_id),
            )
        })?;
        let connection_id = match partner.connection_id {
            Some(connection_id) if !connection_id.trim().is_empty() => connection_id,
            _ => {
                return Err(ProofTemplateError::from_msg(
                    ProofTemplateErrorKind::PartnerHasNoConnection,
                    format!("Partner {} has no aca-py connection", partner_id),
                ))
            }
        };
        let (proof_request, warnings) = self.compile(template)?;
        Ok(PresentProofRequest {
            connection_id,
            proof_request,
            warnings,
        })
    }

    /// Renders the request body of a template without binding it to a
    /// partner.
    pub fn proof_request_without_partner(
        &self,
        template: &ProofTemplate,
    ) -> ProofTemplateResult<ProofRequest> {
        trace!(
            "ProofTemplateConversion::proof_request_without_partner >>> template: {}",
            template.name
        );
        self.compile(template).map(|(request, _)| request)
    }

    pub fn validate_template(&self, template: &ProofTemplate) -> ProofTemplateResult<()> {
        trace!(
            "ProofTemplateConversion::validate_template >>> template: {}",
            template.name
        );
        validation::validate_with_operators(template, &self.operators)?;
        validation::validate_against_schemas(template, &self.schemas)
    }

    pub fn request_to_template(&self, proof_request: &ProofRequest) -> ProofTemplate {
        reverse::request_to_template(proof_request)
    }

    fn compile(
        &self,
        template: &ProofTemplate,
    ) -> ProofTemplateResult<(ProofRequest, Vec<ConversionWarning>)> {
        if template.attribute_groups.is_empty() {
            return Err(ProofTemplateError::from_msg(
                ProofTemplateErrorKind::InvalidTemplate,
                format!("Proof template {} has no attribute groups", template.name),
            ));
        }
        if template.is_json_ld() {
            return Err(ProofTemplateError::from_msg(
                ProofTemplateErrorKind::ActionNotSupported,
                format!(
                    "Proof template {} uses JSON-LD credentials, only indy requests can be compiled",
                    template.name
                ),
            ));
        }

        let resolved: Vec<(&AttributeGroup, Option<String>)> = template
            .attribute_groups()
            .map(|group| (group, self.resolve_ledger_schema_id(&group.schema_id)))
            .collect();

        let timestamps = RevocationTimestampProvider::new(&self.clock);
        let mut visitor =
            ProofTemplateVisitor::new(&self.config, &self.operators, timestamps).visit_template(template)?;
        for (group, ledger_schema_id) in &resolved {
            visitor = match ledger_schema_id {
                Some(ledger_schema_id) => visitor.visit_attribute_group(ledger_schema_id, group)?,
                None => visitor.skip_element(
                    ProofTemplateErrorKind::SchemaNotFound,
                    format!(
                        "Skipping attribute group, schema {} could not be resolved",
                        group.schema_id
                    ),
                ),
            };
        }
        for (group, ledger_schema_id) in &resolved {
            let Some(ledger_schema_id) = ledger_schema_id else {
                continue;
            };
            for attribute in &group.attributes {
                visitor = visitor.visit_attribute(ledger_schema_id, attribute)?;
            }
        }
        visitor.into_parts()
    }

    fn resolve_ledger_schema_id(&self, local_schema_ref: &str) -> Option<String> {
        let ledger_schema_id = self
            .schemas
            .get_schema(local_schema_ref)
            .map(|schema| schema.ledger_schema_id);
        debug!(
            "Resolved schema reference {} to {:?}",
            local_schema_ref, ledger_schema_id
        );
        ledger_schema_id
    }
}
