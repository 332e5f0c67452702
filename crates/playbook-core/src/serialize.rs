//! Serializer adapter
//!
//! Flattens the entity graph into a generic ordered mapping and normalizes
//! it for text emission. Unset optional fields never appear; entity field
//! order and list order are preserved.

use playbook_model::PlaybookDocument;
use serde_yaml::{Mapping, Value};

use crate::error::{PlaybookError, PlaybookResult};

/// Flatten the document into a normalized generic value
///
/// # Errors
/// [`PlaybookError::MissingConnection`] if the connection block is unset,
/// [`PlaybookError::Emit`] if flattening fails
pub fn to_document(document: &PlaybookDocument) -> PlaybookResult<Value> {
    if document.connection().is_none() {
        return Err(PlaybookError::MissingConnection);
    }
    let value = serde_yaml::to_value(document)?;
    Ok(stringify_keys(value))
}

/// Recursively convert every mapping key to a string
///
/// Numbers and booleans become their text form; null becomes `""`.
/// Non-scalar keys are rendered as inline YAML.
#[must_use]
pub fn stringify_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut result = Mapping::with_capacity(map.len());
            for (key, val) in map {
                result.insert(Value::String(key_text(key)), stringify_keys(val));
            }
            Value::Mapping(result)
        }
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(stringify_keys).collect()),
        Value::Tagged(mut tagged) => {
            tagged.value = stringify_keys(tagged.value);
            Value::Tagged(tagged)
        }
        scalar => scalar,
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Render a normalized value as YAML text
///
/// # Errors
/// [`PlaybookError::Emit`] on emitter failure
pub fn emit(value: &Value) -> PlaybookResult<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// [`to_document`] then [`emit`]
///
/// # Errors
/// Any error of either step
pub fn to_yaml(document: &PlaybookDocument) -> PlaybookResult<String> {
    emit(&to_document(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook_model::{CertificateTask, ConnectionConfig, Credentials};
    use pretty_assertions::assert_eq;

    fn vaas_document() -> PlaybookDocument {
        let mut document = PlaybookDocument::new();
        document.config.connection = Some(ConnectionConfig::vaas(Credentials::new(
            "vcert-sdk",
            "api-key",
        )));
        document
    }

    #[test]
    fn requires_connection() {
        let err = to_document(&PlaybookDocument::new()).unwrap_err();
        assert!(matches!(err, PlaybookError::MissingConnection));
    }

    #[test]
    fn vaas_document_yaml() {
        let mut document = vaas_document();
        let mut task = CertificateTask::new("t1");
        task.setenvvars = Some(vec!["b".to_string(), "a".to_string()]);
        document.certificate_tasks = Some(vec![task]);

        let yaml = to_yaml(&document).unwrap();
        assert_eq!(
            yaml,
            "config:\n  connection:\n    platform: vaas\n    credentials:\n      clientId: vcert-sdk\n      accessToken: api-key\ncertificateTasks:\n- name: t1\n  setenvvars:\n  - b\n  - a\n"
        );
    }

    #[test]
    fn stringify_nested_keys() {
        let value: Value = serde_yaml::from_str("1: {true: [ {2: x} ]}\n~: y\n").unwrap();
        let normalized = stringify_keys(value);
        let expected: Value =
            serde_yaml::from_str("'1': {'true': [ {'2': x} ]}\n'': y\n").unwrap();
        assert_eq!(normalized, expected);
    }

    #[test]
    fn output_has_no_nulls() {
        let mut document = vaas_document();
        document.certificate_tasks = Some(vec![CertificateTask::new("t1")]);
        let value = to_document(&document).unwrap();

        fn has_null(value: &Value) -> bool {
            match value {
                Value::Null => true,
                Value::Mapping(map) => map.values().any(has_null),
                Value::Sequence(items) => items.iter().any(has_null),
                _ => false,
            }
        }
        assert!(!has_null(&value));
    }
}
