use serde::{Deserialize, Serialize};

use super::error::AuditError;

/// One contract submitted for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequest {
    contract_name: String,
    language: String,
    source_code: String,
}

impl AuditRequest {
    /// Builds a request, rejecting a blank contract name or language.
    ///
    /// The language is free text and is not checked against any list. The
    /// source is accepted as-is regardless of size.
    pub fn new(
        contract_name: impl Into<String>,
        language: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Result<Self, AuditError> {
        let contract_name = contract_name.into();
        let language = language.into();

        if contract_name.trim().is_empty() {
            return Err(AuditError::InvalidRequest(
                "contract name must not be empty".to_string(),
            ));
        }
        if language.trim().is_empty() {
            return Err(AuditError::InvalidRequest(
                "contract language must not be empty".to_string(),
            ));
        }

        Ok(Self {
            contract_name,
            language,
            source_code: source_code.into(),
        })
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }
}
