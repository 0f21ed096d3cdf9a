use std::collections::BTreeMap;

use crate::{
    builder::SchemaRequestBuilder,
    config::ProofTemplateConfig,
    data_types::{
        pres_request::{ConversionWarning, ProofRequest},
        template::{Attribute, AttributeGroup, ProofTemplate},
    },
    errors::error::prelude::*,
    operators::{ConditionOperator, OperatorRegistry},
    revocation::RevocationTimestampProvider,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VisitorState {
    Empty,
    TemplateVisited,
    GroupsVisited,
    AttributesVisited,
}

/// Compiles one template into a proof request. The template is visited
/// first, then every attribute group, then every attribute. Each visit
/// consumes the visitor, so an instance serves a single compilation.
#[derive(Debug)]
pub struct ProofTemplateVisitor<'a> {
    state: VisitorState,
    name: String,
    config: &'a ProofTemplateConfig,
    operators: &'a OperatorRegistry,
    timestamps: RevocationTimestampProvider<'a>,
    builders: BTreeMap<String, SchemaRequestBuilder>,
    warnings: Vec<ConversionWarning>,
}

impl<'a> ProofTemplateVisitor<'a> {
    pub fn new(
        config: &'a ProofTemplateConfig,
        operators: &'a OperatorRegistry,
        timestamps: RevocationTimestampProvider<'a>,
    ) -> Self {
        Self {
            state: VisitorState::Empty,
            name: String::new(),
            config,
            operators,
            timestamps,
            builders: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn visit_template(mut self, template: &ProofTemplate) -> ProofTemplateResult<Self> {
        trace!("ProofTemplateVisitor::visit_template >>> name: {}", template.name);
        self.expect_state(&[VisitorState::Empty], "visit_template")?;
        self.name.clone_from(&template.name);
        self.state = VisitorState::TemplateVisited;
        Ok(self)
    }

    pub fn visit_attribute_group(
        mut self,
        ledger_schema_id: &str,
        group: &AttributeGroup,
    ) -> ProofTemplateResult<Self> {
        trace!(
            "ProofTemplateVisitor::visit_attribute_group >>> ledger_schema_id: {}",
            ledger_schema_id
        );
        self.expect_state(
            &[VisitorState::TemplateVisited, VisitorState::GroupsVisited],
            "visit_attribute_group",
        )?;
        let policy = self.config.repeated_predicates;
        let builder = self
            .builders
            .entry(ledger_schema_id.to_string())
            .or_insert_with(|| SchemaRequestBuilder::new(ledger_schema_id, policy));
        builder.add_schema_level_restrictions(&group.schema_level_restrictions);
        ConditionOperator::SchemaId.apply(builder, None, Some(ledger_schema_id), &self.timestamps)?;
        if group.non_revoked {
            ConditionOperator::NonRevoked.apply(builder, None, None, &self.timestamps)?;
        }
        self.state = VisitorState::GroupsVisited;
        Ok(self)
    }

    pub fn visit_attribute(
        mut self,
        ledger_schema_id: &str,
        attribute: &Attribute,
    ) -> ProofTemplateResult<Self> {
        trace!(
            "ProofTemplateVisitor::visit_attribute >>> ledger_schema_id: {}, attribute: {}",
            ledger_schema_id,
            attribute.name
        );
        self.expect_state(
            &[VisitorState::GroupsVisited, VisitorState::AttributesVisited],
            "visit_attribute",
        )?;
        let builder = self.builders.get_mut(ledger_schema_id).ok_or_else(|| {
            ProofTemplateError::from_msg(
                ProofTemplateErrorKind::InvalidState,
                format!(
                    "Attribute {} visited before its group for schema {}",
                    attribute.name, ledger_schema_id
                ),
            )
        })?;
        self.state = VisitorState::AttributesVisited;

        let name = attribute.name.trim();
        if name.is_empty() {
            record_warning(
                &mut self.warnings,
                ProofTemplateErrorKind::InvalidTemplate,
                format!("Skipping attribute without name in schema {}", ledger_schema_id),
            );
            return Ok(self);
        }

        for condition in &attribute.conditions {
            let Some(operator) = self.operators.resolve(&condition.operator) else {
                record_warning(
                    &mut self.warnings,
                    ProofTemplateErrorKind::UnknownOperator,
                    format!(
                        "Skipping condition with unknown operator `{}` on attribute {}",
                        condition.operator, name
                    ),
                );
                continue;
            };
            if let Err(err) = operator.apply(
                builder,
                Some(name),
                condition.value.as_deref(),
                &self.timestamps,
            ) {
                record_warning(
                    &mut self.warnings,
                    err.kind(),
                    format!(
                        "Skipping condition `{}` on attribute {}: {}",
                        condition.operator,
                        name,
                        err.msg()
                    ),
                );
            }
        }
        builder.add_attribute(name);
        Ok(self)
    }

    /// Records an element that was skipped before reaching the visitor,
    /// such as a group whose schema could not be resolved.
    pub fn skip_element(mut self, kind: ProofTemplateErrorKind, message: impl Into<String>) -> Self {
        record_warning(&mut self.warnings, kind, message.into());
        self
    }

    pub fn into_result(self) -> ProofTemplateResult<ProofRequest> {
        self.into_parts().map(|(request, _)| request)
    }

    /// The compiled request, with one requested attribute entry per ledger
    /// schema, plus every warning recorded on the way.
    pub fn into_parts(self) -> ProofTemplateResult<(ProofRequest, Vec<ConversionWarning>)> {
        trace!("ProofTemplateVisitor::into_parts >>> schemas: {}", self.builders.len());
        if self.state == VisitorState::Empty {
            return Err(err_msg(
                ProofTemplateErrorKind::InvalidState,
                "No template has been visited",
            ));
        }
        let mut request = ProofRequest::new(self.name, self.config.version.clone());
        for (schema_id, builder) in &self.builders {
            if let Some(attributes) = builder.requested_attributes() {
                request
                    .requested_attributes
                    .insert(schema_id.clone(), attributes);
            }
            request
                .requested_predicates
                .extend(builder.requested_predicates());
        }
        debug!(
            "Compiled proof request {} with {} attribute groups and {} predicates",
            request.name,
            request.requested_attributes.len(),
            request.requested_predicates.len()
        );
        Ok((request, self.warnings))
    }

    fn expect_state(&self, allowed: &[VisitorState], operation: &str) -> ProofTemplateResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ProofTemplateError::from_msg(
                ProofTemplateErrorKind::InvalidState,
                format!("Cannot {} in state {:?}", operation, self.state),
            ))
        }
    }
}

fn record_warning(warnings: &mut Vec<ConversionWarning>, kind: ProofTemplateErrorKind, message: String) {
    warn!("{}", message);
    warnings.push(ConversionWarning::new(kind, message));
}
