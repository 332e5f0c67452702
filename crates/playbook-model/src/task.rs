//! Certificate tasks and their request sub-entities

use serde::{Deserialize, Serialize};

use crate::installation::Installation;

/// One named unit of work within a playbook
///
/// `name` is the lookup key, but uniqueness is not enforced. See
/// [`crate::PlaybookDocument::find_task`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateTask {
    /// Task name
    pub name: String,

    /// Issuance specification, replaced wholesale when reattached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,

    /// Installation steps; `None` until explicitly initialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installations: Option<Vec<Installation>>,

    /// Environment variables exported after issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setenvvars: Option<Vec<String>>,

    /// Renewal window, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_before: Option<String>,
}

impl CertificateTask {
    /// Create task with every optional field unset
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Certificate issuance specification
///
/// Fields appear in serialized output in declaration order, under the
/// engine's key names (`keySize`, `sanDNS`, ...), which differ from the
/// assignment keys for several fields. Scalar fields are populated through
/// the request field registry; `subject`, `location`, `zone` and `nickname`
/// through dedicated assembler operations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadn: Option<String>,
    #[serde(default, rename = "chain", skip_serializing_if = "Option::is_none")]
    pub chain_option: Option<String>,
    #[serde(default, rename = "csr", skip_serializing_if = "Option::is_none")]
    pub csr_origin: Option<String>,
    #[serde(default, rename = "sanDNS", skip_serializing_if = "Option::is_none")]
    pub dns_names: Option<Vec<String>>,
    #[serde(default, rename = "sanEmail", skip_serializing_if = "Option::is_none")]
    pub email_addresses: Option<Vec<String>>,
    #[serde(default, rename = "eku", skip_serializing_if = "Option::is_none")]
    pub ext_key_usages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_private_key: Option<bool>,
    #[serde(default, rename = "sanIP", skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_curve: Option<String>,
    #[serde(default, rename = "keySize", skip_serializing_if = "Option::is_none")]
    pub key_length: Option<i64>,
    /// Kept for the caller; the engine reads it from its own input, never
    /// from the playbook.
    #[serde(default, skip_serializing)]
    pub key_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit_sans: Option<bool>,
    #[serde(default, rename = "appInfo", skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, rename = "sanUPN", skip_serializing_if = "Option::is_none")]
    pub upns: Option<Vec<String>>,
    #[serde(default, rename = "sanURI", skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// X.509 subject fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_units: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Subject {
    /// Common name, treating the empty string as unset
    #[inline]
    #[must_use]
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref().filter(|cn| !cn.is_empty())
    }
}

/// Deployment coordinate for a certificate
///
/// Always created whole, so no field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub instance: String,
    pub workload: String,
    pub tls_address: String,
    pub replace: bool,
}
