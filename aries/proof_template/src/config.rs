use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::errors::error::prelude::*;

pub const DEFAULT_PROOF_REQUEST_VERSION: &str = "1.0";

/// How repeated relational conditions on the same attribute are compiled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatedPredicatePolicy {
    /// Every predicate type gets its own predicate, so `>= 5` and `< 10` on one
    /// attribute request a range. The same type applied twice keeps the last
    /// value.
    #[default]
    Separate,
    /// One predicate per attribute; the last relational condition overwrites
    /// type and value of earlier ones.
    LastWriteWins,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct ProofTemplateConfig {
    #[builder(default = DEFAULT_PROOF_REQUEST_VERSION.to_string(), setter(into))]
    pub version: String,
    #[builder(default)]
    pub repeated_predicates: RepeatedPredicatePolicy,
}

impl Default for ProofTemplateConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProofTemplateConfig {
    pub fn from_json(config: &str) -> ProofTemplateResult<Self> {
        let config: Self = serde_json::from_str(config).map_err(|err| {
            ProofTemplateError::from_msg(
                ProofTemplateErrorKind::InvalidConfiguration,
                format!("Cannot parse proof template config: {}", err),
            )
        })?;
        if config.version.trim().is_empty() {
            return Err(err_msg(
                ProofTemplateErrorKind::InvalidConfiguration,
                "Proof request version must not be empty",
            ));
        }
        Ok(config)
    }
}
