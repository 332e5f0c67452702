//! Connection block
//!
//! Describes which platform the automation engine talks to and the
//! credentials it authenticates with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target platform for certificate operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Self-hosted trust protection platform (URL + trust bundle + token)
    Tpp,
    /// SaaS platform (API key only)
    Vaas,
}

impl Platform {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tpp => "tpp",
            Self::Vaas => "vaas",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform name not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    /// Case-insensitive, so scenario spellings like `TPP` and `VaaS` parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tpp" => Ok(Self::Tpp),
            "vaas" => Ok(Self::Vaas),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// Authentication material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Fixed client identifier
    pub client_id: String,
    /// Token (tpp) or API key (vaas)
    pub access_token: String,
}

impl Credentials {
    /// Create credentials
    #[inline]
    #[must_use]
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            access_token: access_token.into(),
        }
    }
}

/// Connection configuration
///
/// `url` and `trust_bundle` only exist for [`Platform::Tpp`]. For
/// [`Platform::Vaas`] they are `None` and absent from the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Target platform
    pub platform: Platform,

    /// Platform base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// PEM trust bundle path or content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_bundle: Option<String>,

    /// Authentication material
    pub credentials: Credentials,
}

impl ConnectionConfig {
    /// Connection to a self-hosted platform
    #[must_use]
    pub fn tpp(
        url: impl Into<String>,
        trust_bundle: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            platform: Platform::Tpp,
            url: Some(url.into()),
            trust_bundle: Some(trust_bundle.into()),
            credentials,
        }
    }

    /// Connection to the SaaS platform
    #[must_use]
    pub fn vaas(credentials: Credentials) -> Self {
        Self {
            platform: Platform::Vaas,
            url: None,
            trust_bundle: None,
            credentials,
        }
    }
}
