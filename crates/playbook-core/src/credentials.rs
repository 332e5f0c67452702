//! Credential sources
//!
//! Where connection inputs come from. The assembler only asks for values by
//! name; reading the process environment is one implementation.

use std::collections::HashMap;

use playbook_model::Platform;

use crate::config::{
    ENV_CLOUD_APIKEY, ENV_CLOUD_ZONE, ENV_TPP_ACCESS_TOKEN, ENV_TPP_TRUST_BUNDLE, ENV_TPP_URL,
    ENV_TPP_ZONE,
};
use crate::error::{PlaybookError, PlaybookResult};

/// Named credential lookup
pub trait CredentialSource {
    /// Value for `name`, `None` if absent
    fn get(&self, name: &str) -> Option<String>;

    /// Value for `name` on behalf of `platform`
    ///
    /// # Errors
    /// [`PlaybookError::MissingEnvironment`] naming the variable
    fn require(&self, platform: Platform, name: &str) -> PlaybookResult<String> {
        self.get(name).ok_or_else(|| PlaybookError::MissingEnvironment {
            platform,
            variables: vec![name.to_string()],
        })
    }
}

/// Process environment; empty values count as absent
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialSource;

impl CredentialSource for EnvCredentialSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// In-memory credentials
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialSource {
    values: HashMap<String, String>,
}

impl StaticCredentialSource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With one variable set
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentialSource {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|value| !value.is_empty()).cloned()
    }
}

impl<S: CredentialSource + ?Sized> CredentialSource for &S {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// Variables a platform's connection block needs
#[must_use]
pub fn required_variables(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Tpp => &[ENV_TPP_URL, ENV_TPP_TRUST_BUNDLE, ENV_TPP_ACCESS_TOKEN],
        Platform::Vaas => &[ENV_CLOUD_APIKEY],
    }
}

/// Variable holding a platform's default zone
#[must_use]
pub fn zone_variable(platform: Platform) -> &'static str {
    match platform {
        Platform::Tpp => ENV_TPP_ZONE,
        Platform::Vaas => ENV_CLOUD_ZONE,
    }
}

/// Check that every required variable is present
///
/// # Errors
/// [`PlaybookError::MissingEnvironment`] listing all absent variables
pub fn validate_environment(platform: Platform, source: &impl CredentialSource) -> PlaybookResult<()> {
    let missing: Vec<String> = required_variables(platform)
        .iter()
        .filter(|name| source.get(name).is_none())
        .map(|name| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PlaybookError::MissingEnvironment {
            platform,
            variables: missing,
        })
    }
}
