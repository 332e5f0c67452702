//! Error types for the playbook assembler
//!
//! Every error is raised at the point of misuse and aborts the current
//! scenario. Nothing here is retryable.

use playbook_model::{Platform, UnknownPlatform};

use crate::registry::{EntityKind, FieldKind};

/// Main assembler error type
#[derive(Debug, thiserror::Error)]
pub enum PlaybookError {
    /// Credential inputs required by the platform are absent
    #[error("missing environment for {platform}: {}", .variables.join(", "))]
    MissingEnvironment {
        platform: Platform,
        variables: Vec<String>,
    },

    /// Platform name not recognised
    #[error("unknown platform: '{0}'")]
    UnknownPlatform(String),

    /// Key not in the closed vocabulary for the entity
    #[error("unknown {entity} field: '{key}'")]
    UnknownField { entity: EntityKind, key: String },

    /// Raw value could not be coerced to the key's kind
    #[error("invalid value for key '{key}': expected {expected}, got '{actual}'")]
    InvalidType {
        key: String,
        expected: FieldKind,
        actual: String,
    },

    /// Scalar assignment attempted on a structural field
    #[error("request key '{key}' is structural: {hint}")]
    StructuredFieldMisuse { key: String, hint: &'static str },

    /// Operation needs an ancestor entity that does not exist yet
    #[error("cannot {operation} for task '{task}': no {parent} defined")]
    MissingParent {
        task: String,
        parent: &'static str,
        operation: &'static str,
    },

    /// Nickname derivation: task has no request
    #[error("cannot derive nickname for task '{task}': no request defined")]
    MissingRequest { task: String },

    /// Nickname derivation: request has no subject
    #[error("cannot derive nickname for task '{task}': no subject defined")]
    MissingSubject { task: String },

    /// Nickname derivation: subject has no (or an empty) common name
    #[error("cannot derive nickname for task '{task}': no commonName defined")]
    MissingCommonName { task: String },

    /// Serialization attempted before the connection block was set
    #[error("playbook has no connection configured")]
    MissingConnection,

    /// Text emitter failure
    #[error("emit failed: {0}")]
    Emit(#[from] serde_yaml::Error),

    /// Scenario file could not be parsed
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// Scenario instruction failed
    #[error("scenario step {index} failed: {source}")]
    Scenario {
        index: usize,
        #[source]
        source: Box<PlaybookError>,
    },
}

impl PlaybookError {
    /// Create missing parent error
    #[inline]
    pub fn missing_parent(
        task: impl Into<String>,
        parent: &'static str,
        operation: &'static str,
    ) -> Self {
        Self::MissingParent {
            task: task.into(),
            parent,
            operation,
        }
    }

    /// Create invalid type error
    #[inline]
    pub fn invalid_type(key: impl Into<String>, expected: FieldKind, actual: impl Into<String>) -> Self {
        Self::InvalidType {
            key: key.into(),
            expected,
            actual: actual.into(),
        }
    }

    /// Check if error is an unmet structural precondition
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingParent { .. }
                | Self::MissingRequest { .. }
                | Self::MissingSubject { .. }
                | Self::MissingCommonName { .. }
                | Self::MissingConnection
        )
    }

    /// Check if error was caused by a bad field key or value
    #[inline]
    #[must_use]
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. } | Self::InvalidType { .. } | Self::StructuredFieldMisuse { .. }
        )
    }

    /// Innermost error, unwrapping scenario step context
    #[must_use]
    pub fn root(&self) -> &PlaybookError {
        match self {
            Self::Scenario { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<UnknownPlatform> for PlaybookError {
    fn from(err: UnknownPlatform) -> Self {
        Self::UnknownPlatform(err.0)
    }
}

/// Result type alias for assembler operations
pub type PlaybookResult<T> = Result<T, PlaybookError>;
