//! Credentials an automation session needs before it may be initialized.

use std::fmt;

use crate::error::MissingCredentialError;

/// Environment variable holding the LLM provider key.
pub const LLM_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Environment variable holding the automation platform key.
pub const AUTOMATION_API_KEY_VAR: &str = "BROWSERBASE_API_KEY";
/// Environment variable holding the automation platform project id.
pub const AUTOMATION_PROJECT_ID_VAR: &str = "BROWSERBASE_PROJECT_ID";

/// The three secrets required to open a session.
///
/// `Debug` never prints the secret values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    llm_api_key: String,
    automation_api_key: String,
    automation_project_id: String,
}

impl Credentials {
    /// Resolve every credential through `lookup`, keyed by variable name.
    ///
    /// Empty values count as missing. The LLM key is checked first.
    ///
    /// # Errors
    ///
    /// Returns [`MissingCredentialError`] naming the first missing category.
    pub fn resolve<F>(lookup: F) -> Result<Self, MissingCredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let llm_api_key = present(LLM_API_KEY_VAR).ok_or(MissingCredentialError::LlmProvider)?;
        let (Some(automation_api_key), Some(automation_project_id)) = (
            present(AUTOMATION_API_KEY_VAR),
            present(AUTOMATION_PROJECT_ID_VAR),
        ) else {
            return Err(MissingCredentialError::AutomationPlatform);
        };

        Ok(Self {
            llm_api_key,
            automation_api_key,
            automation_project_id,
        })
    }

    #[must_use]
    pub fn llm_api_key(&self) -> &str {
        &self.llm_api_key
    }

    #[must_use]
    pub fn automation_api_key(&self) -> &str {
        &self.automation_api_key
    }

    #[must_use]
    pub fn automation_project_id(&self) -> &str {
        &self.automation_project_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &"<redacted>")
            .field("automation_api_key", &"<redacted>")
            .field("automation_project_id", &self.automation_project_id)
            .finish()
    }
}
