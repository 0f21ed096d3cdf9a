#[macro_use]
extern crate log;

pub mod builder;
pub mod config;
pub mod conversion;
pub mod data_types;
pub mod errors;
pub mod operators;
pub mod reverse;
pub mod revocation;
pub mod validation;
pub mod visitor;

pub use config::{ProofTemplateConfig, RepeatedPredicatePolicy};
pub use conversion::{Partner, PartnerRepository, ProofTemplateConversion, SchemaInfo, SchemaResolver};
pub use errors::error::{ProofTemplateError, ProofTemplateErrorKind, ProofTemplateResult};
pub use revocation::{Clock, FixedClock, SystemClock};
