//! Assembler configuration
//!
//! Process-wide constants used when deriving values: the fixed client id,
//! the file path template pieces and the fixed installation actions.

use serde::{Deserialize, Serialize};

/// Self-hosted platform base URL
pub const ENV_TPP_URL: &str = "TPP_URL";
/// Self-hosted platform trust bundle
pub const ENV_TPP_TRUST_BUNDLE: &str = "TPP_TRUST_BUNDLE";
/// Self-hosted platform access token
pub const ENV_TPP_ACCESS_TOKEN: &str = "TPP_ACCESS_TOKEN";
/// Self-hosted platform default zone
pub const ENV_TPP_ZONE: &str = "TPP_ZONE";
/// SaaS platform API key
pub const ENV_CLOUD_APIKEY: &str = "CLOUD_APIKEY";
/// SaaS platform default zone
pub const ENV_CLOUD_ZONE: &str = "CLOUD_ZONE";

/// Assembler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Value written to `credentials.clientId`
    pub client_id: String,
    /// Unresolved working-directory marker, expanded later by the automation engine
    pub pwd_expr: String,
    /// Path separator used in file templates
    pub path_separator: String,
    /// Directory installation files are written under
    pub temp_dir: String,
    /// Action set by the `installation` flag
    pub after_install_action: String,
    /// Action set by the `validation` flag
    pub install_validation_action: String,
    /// Prefix for nicknames derived from the common name
    pub nickname_prefix: String,
    /// Domain suffix for generated common names
    pub random_cn_domain: String,
}

impl AssemblerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With client id
    #[inline]
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// With temp directory
    #[inline]
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<String>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// With path separator
    #[inline]
    #[must_use]
    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.path_separator = separator.into();
        self
    }

    /// With random common name domain
    #[inline]
    #[must_use]
    pub fn with_random_cn_domain(mut self, domain: impl Into<String>) -> Self {
        self.random_cn_domain = domain.into();
        self
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            client_id: "vcert-sdk".to_string(),
            pwd_expr: "{{- Env \"PWD\" }}".to_string(),
            path_separator: "/".to_string(),
            temp_dir: "tmp".to_string(),
            after_install_action: "echo SuccessInstall".to_string(),
            install_validation_action: "echo SuccessValidation".to_string(),
            nickname_prefix: "friendly.".to_string(),
            random_cn_domain: "vcert.example.com".to_string(),
        }
    }
}
