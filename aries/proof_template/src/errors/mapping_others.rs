use std::num::ParseIntError;

use super::error::{ProofTemplateError, ProofTemplateErrorKind};

impl From<serde_json::Error> for ProofTemplateError {
    fn from(err: serde_json::Error) -> Self {
        ProofTemplateError::from_msg(
            ProofTemplateErrorKind::InvalidJson,
            format!("(De)serialization failed; err: {}", err),
        )
    }
}

impl From<ParseIntError> for ProofTemplateError {
    fn from(err: ParseIntError) -> Self {
        ProofTemplateError::from_msg(ProofTemplateErrorKind::ParsingError, err.to_string())
    }
}
