use std::{error::Error, fmt};

use thiserror;

pub mod prelude {
    pub use super::{err_msg, ProofTemplateError, ProofTemplateErrorKind, ProofTemplateResult};
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum ProofTemplateErrorKind {
    // Common
    #[error("Object is in invalid state for requested operation")]
    InvalidState,
    #[error("Invalid Configuration")]
    InvalidConfiguration,
    #[error("Invalid JSON string")]
    InvalidJson,
    #[error("Invalid input parameter")]
    InvalidInput,
    #[error("Action is not supported")]
    ActionNotSupported,
    #[error("Could not parse a value")]
    ParsingError,

    // Partner
    #[error("Partner not found")]
    PartnerNotFound,
    #[error("Partner has no aca-py connection")]
    PartnerHasNoConnection,

    // Template
    #[error("Proof template is invalid")]
    InvalidTemplate,
    #[error("Schema could not be resolved")]
    SchemaNotFound,
    #[error("Attribute is not part of the schema")]
    UnknownSchemaAttribute,
    #[error("Unknown condition operator")]
    UnknownOperator,
    #[error("Condition value is not valid for its operator")]
    InvalidConditionValue,
}

#[derive(thiserror::Error)]
pub struct ProofTemplateError {
    msg: String,
    kind: ProofTemplateErrorKind,
}

fn format_error(err: &ProofTemplateError, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "Error: {}", err.msg())?;
    let mut current = err.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

impl fmt::Display for ProofTemplateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_error(self, f)
    }
}

impl fmt::Debug for ProofTemplateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_error(self, f)
    }
}

impl ProofTemplateError {
    fn new(kind: ProofTemplateErrorKind, msg: String) -> Self {
        ProofTemplateError { msg, kind }
    }

    pub fn from_msg<D>(kind: ProofTemplateErrorKind, msg: D) -> ProofTemplateError
    where
        D: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::new(kind, msg.to_string())
    }

    pub fn kind(&self) -> ProofTemplateErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    pub fn extend<D>(self, msg: D) -> ProofTemplateError
    where
        D: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::new(self.kind, format!("{}\n{}", self.msg, msg))
    }

    pub fn map<D>(self, kind: ProofTemplateErrorKind, msg: D) -> ProofTemplateError
    where
        D: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::new(kind, msg.to_string())
    }
}

pub fn err_msg<D>(kind: ProofTemplateErrorKind, msg: D) -> ProofTemplateError
where
    D: fmt::Display + fmt::Debug + Send + Sync + 'static,
{
    ProofTemplateError::from_msg(kind, msg)
}

pub type ProofTemplateResult<T> = Result<T, ProofTemplateError>;
