//! Installation entries

use std::fmt;

use serde::{Deserialize, Serialize};

/// File format an issued certificate is installed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallationFormat {
    /// Certificate, chain and key as separate PEM files
    #[serde(rename = "PEM")]
    Pem,
    /// Java keystore
    #[serde(rename = "JKS")]
    Jks,
    /// PKCS#12 archive
    #[serde(rename = "PKCS12")]
    Pkcs12,
}

impl InstallationFormat {
    /// Upper-case wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pem => "PEM",
            Self::Jks => "JKS",
            Self::Pkcs12 => "PKCS12",
        }
    }
}

impl fmt::Display for InstallationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One installation of the issued certificate
///
/// Variant-specific fields (`chain_file`/`key_file` for PEM,
/// `jks_alias`/`jks_password` for JKS) stay `None` for other formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub format: InstallationFormat,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jks_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jks_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_install_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_validation_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_files: Option<bool>,
}

impl Installation {
    /// Installation with only the required `format` and `file`
    #[must_use]
    pub fn new(format: InstallationFormat, file: impl Into<String>) -> Self {
        Self {
            format,
            file: file.into(),
            chain_file: None,
            key_file: None,
            jks_alias: None,
            jks_password: None,
            after_install_action: None,
            install_validation_action: None,
            backup_files: None,
        }
    }
}
