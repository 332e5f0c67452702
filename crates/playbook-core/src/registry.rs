//! Field type registry
//!
//! Closed vocabularies mapping a textual key to exactly one value kind and
//! a typed setter. Dispatch is a table lookup: a key that is not in the
//! table is an [`PlaybookError::UnknownField`], never a reflection failure.
//!
//! # Coercion rules
//!
//! | kind | accepted input |
//! |---|---|
//! | `String` | text, stored unchanged |
//! | `Integer` | base-10 text |
//! | `Boolean` | exactly `"true"` or `"false"` |
//! | `ArrayOfString` | comma-separated text, or a sequence of strings |
//!
//! Raw values are text. A YAML number or boolean is rejected for every
//! kind: by the time it is a number the source spelling (`0x1F`, `True`)
//! is gone.
//!
//! The key a caller assigns is not always the key the engine reads back.
//! Each entry carries its wire name (`keyLength` is emitted as `keySize`),
//! and `keyPassword` is never emitted at all.
//!
//! The Boolean parser here is strict. [`parse_lenient_bool`] is the
//! never-failing variant used for `Location.replace`; the two must stay
//! different.

use std::fmt;

use once_cell::sync::Lazy;
use playbook_model::{Request, Subject};
use serde_yaml::Value;

use crate::error::{PlaybookError, PlaybookResult};

/// Value kind a field key is classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    ArrayOfString,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Boolean => "Boolean",
            Self::ArrayOfString => "ArrayOfString",
        };
        f.write_str(name)
    }
}

/// Entity a vocabulary belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Request,
    Subject,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Subject => f.write_str("subject"),
        }
    }
}

/// Typed setter for one field
///
/// The variant fixes the field's kind, so a coerced value can only reach a
/// setter of matching type.
pub enum Setter<E> {
    String(fn(&mut E, String)),
    Integer(fn(&mut E, i64)),
    Boolean(fn(&mut E, bool)),
    ArrayOfString(fn(&mut E, Vec<String>)),
}

impl<E> Setter<E> {
    /// Kind implied by the setter type
    #[inline]
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::String(_) => FieldKind::String,
            Self::Integer(_) => FieldKind::Integer,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::ArrayOfString(_) => FieldKind::ArrayOfString,
        }
    }
}

// Manual impls: derive would require `E: Clone`.
impl<E> Clone for Setter<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Setter<E> {}

impl<E> fmt::Debug for Setter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Setter::{}", self.kind())
    }
}

/// Registry entry
#[derive(Debug)]
pub struct FieldSpec<E> {
    /// Vocabulary key
    pub key: &'static str,
    /// Serialized field name, `None` if never emitted
    pub wire: Option<&'static str>,
    /// Typed setter
    pub setter: Setter<E>,
}

impl<E> FieldSpec<E> {
    /// Kind of this field
    #[inline]
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.setter.kind()
    }
}

/// Closed vocabulary for one entity type
#[derive(Debug)]
pub struct FieldRegistry<E> {
    entity: EntityKind,
    fields: Vec<FieldSpec<E>>,
    structural: Vec<(&'static str, &'static str)>,
}

impl<E> FieldRegistry<E> {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            fields: Vec::new(),
            structural: Vec::new(),
        }
    }

    fn with(mut self, key: &'static str, setter: Setter<E>) -> Self {
        debug_assert!(self.spec(key).is_none(), "duplicate field key: {key}");
        self.fields.push(FieldSpec {
            key,
            wire: Some(key),
            setter,
        });
        self
    }

    /// Emit the last registered field under `wire`
    #[must_use]
    pub fn emitted_as(mut self, wire: &'static str) -> Self {
        if let Some(spec) = self.fields.last_mut() {
            spec.wire = Some(wire);
        }
        self
    }

    /// Keep the last registered field out of the serialized document
    #[must_use]
    pub fn not_emitted(mut self) -> Self {
        if let Some(spec) = self.fields.last_mut() {
            spec.wire = None;
        }
        self
    }

    /// Register a String field
    #[must_use]
    pub fn string(self, key: &'static str, set: fn(&mut E, String)) -> Self {
        self.with(key, Setter::String(set))
    }

    /// Register an Integer field
    #[must_use]
    pub fn integer(self, key: &'static str, set: fn(&mut E, i64)) -> Self {
        self.with(key, Setter::Integer(set))
    }

    /// Register a Boolean field
    #[must_use]
    pub fn boolean(self, key: &'static str, set: fn(&mut E, bool)) -> Self {
        self.with(key, Setter::Boolean(set))
    }

    /// Register an ArrayOfString field
    #[must_use]
    pub fn string_array(self, key: &'static str, set: fn(&mut E, Vec<String>)) -> Self {
        self.with(key, Setter::ArrayOfString(set))
    }

    /// Reserve a key that must be set through a structural operation
    #[must_use]
    pub fn structural(mut self, key: &'static str, hint: &'static str) -> Self {
        self.structural.push((key, hint));
        self
    }

    /// Entity this vocabulary belongs to
    #[inline]
    #[must_use]
    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Look up a field spec
    #[must_use]
    pub fn spec(&self, key: &str) -> Option<&FieldSpec<E>> {
        self.fields.iter().find(|spec| spec.key == key)
    }

    /// Kind of a key, if registered
    #[inline]
    #[must_use]
    pub fn kind_of(&self, key: &str) -> Option<FieldKind> {
        self.spec(key).map(FieldSpec::kind)
    }

    /// Serialized name of a key; `None` if unknown or never emitted
    #[must_use]
    pub fn wire_name(&self, key: &str) -> Option<&'static str> {
        self.spec(key).and_then(|spec| spec.wire)
    }

    /// All registered keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.key)
    }

    /// Registered keys of one kind
    #[must_use]
    pub fn keys_of_kind(&self, kind: FieldKind) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|spec| spec.kind() == kind)
            .map(|spec| spec.key)
            .collect()
    }

    /// Number of registered fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Coerce `raw` to the key's kind and store it on `entity`
    ///
    /// # Errors
    /// - [`PlaybookError::StructuredFieldMisuse`] for reserved keys
    /// - [`PlaybookError::UnknownField`] for keys outside the vocabulary
    /// - [`PlaybookError::InvalidType`] when coercion fails
    pub fn assign(&self, entity: &mut E, key: &str, raw: &Value) -> PlaybookResult<()> {
        if let Some((_, hint)) = self.structural.iter().find(|(reserved, _)| *reserved == key) {
            return Err(PlaybookError::StructuredFieldMisuse {
                key: key.to_string(),
                hint: *hint,
            });
        }

        let spec = self.spec(key).ok_or_else(|| PlaybookError::UnknownField {
            entity: self.entity,
            key: key.to_string(),
        })?;

        match spec.setter {
            Setter::String(set) => set(entity, coerce_string(key, raw)?),
            Setter::Integer(set) => set(entity, coerce_integer(key, raw)?),
            Setter::Boolean(set) => set(entity, coerce_boolean(key, raw)?),
            Setter::ArrayOfString(set) => set(entity, coerce_string_array(key, raw)?),
        }

        tracing::debug!("Assigned {} field {} ({})", self.entity, key, spec.kind());
        Ok(())
    }
}

/// Request-level vocabulary
pub static REQUEST_FIELDS: Lazy<FieldRegistry<Request>> = Lazy::new(|| {
    FieldRegistry::<Request>::new(EntityKind::Request)
        .string("cadn", |r, v| r.cadn = Some(v))
        .string("chainOption", |r, v| r.chain_option = Some(v))
        .emitted_as("chain")
        .string("csrOrigin", |r, v| r.csr_origin = Some(v))
        .emitted_as("csr")
        .string("issuerHint", |r, v| r.issuer_hint = Some(v))
        .string("keyCurve", |r, v| r.key_curve = Some(v))
        .string("keyPassword", |r, v| r.key_password = Some(v))
        .not_emitted()
        .string("keyType", |r, v| r.key_type = Some(v))
        .string("origin", |r, v| r.origin = Some(v))
        .emitted_as("appInfo")
        .string("validDays", |r, v| r.valid_days = Some(v))
        .integer("keyLength", |r, v| r.key_length = Some(v))
        .emitted_as("keySize")
        .integer("timeout", |r, v| r.timeout = Some(v))
        .boolean("fetchPrivateKey", |r, v| r.fetch_private_key = Some(v))
        .boolean("omitSans", |r, v| r.omit_sans = Some(v))
        .string_array("dnsNames", |r, v| r.dns_names = Some(v))
        .emitted_as("sanDNS")
        .string_array("emailAddresses", |r, v| r.email_addresses = Some(v))
        .emitted_as("sanEmail")
        .string_array("ipAddresses", |r, v| r.ip_addresses = Some(v))
        .emitted_as("sanIP")
        .string_array("upns", |r, v| r.upns = Some(v))
        .emitted_as("sanUPN")
        .string_array("uris", |r, v| r.uris = Some(v))
        .emitted_as("sanURI")
        .string_array("extKeyUsages", |r, v| r.ext_key_usages = Some(v))
        .emitted_as("eku")
        .structural(
            "location",
            "use the location operation (instance, workload prefix, tlsAddress, replace)",
        )
        .structural(
            "subject",
            "use the subject operation, then assign subject fields",
        )
});

/// Subject-level vocabulary
pub static SUBJECT_FIELDS: Lazy<FieldRegistry<Subject>> = Lazy::new(|| {
    FieldRegistry::<Subject>::new(EntityKind::Subject)
        .string("commonName", |s, v| s.common_name = Some(v))
        .string("country", |s, v| s.country = Some(v))
        .string("locality", |s, v| s.locality = Some(v))
        .string("organization", |s, v| s.organization = Some(v))
        .string("state", |s, v| s.state = Some(v))
        .string_array("orgUnits", |s, v| s.org_units = Some(v))
});

/// Text form of a raw value for error messages
#[must_use]
pub fn describe(raw: &Value) -> String {
    match raw {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) => "<sequence>".to_string(),
        Value::Mapping(_) => "<mapping>".to_string(),
        Value::Tagged(tagged) => format!("<tagged {}>", tagged.tag),
    }
}

/// Text of a raw value; anything but a string fails for `kind`
fn scalar_text<'v>(key: &str, kind: FieldKind, raw: &'v Value) -> PlaybookResult<&'v str> {
    match raw {
        Value::String(s) => Ok(s),
        other => Err(PlaybookError::invalid_type(key, kind, describe(other))),
    }
}

/// String kind: textual input only, stored unchanged
///
/// # Errors
/// [`PlaybookError::InvalidType`] if `raw` is not a string
pub fn coerce_string(key: &str, raw: &Value) -> PlaybookResult<String> {
    scalar_text(key, FieldKind::String, raw).map(str::to_string)
}

/// Integer kind: base-10 parse
///
/// # Errors
/// [`PlaybookError::InvalidType`] naming the unparsable value
pub fn coerce_integer(key: &str, raw: &Value) -> PlaybookResult<i64> {
    let text = scalar_text(key, FieldKind::Integer, raw)?;
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlaybookError::invalid_type(key, FieldKind::Integer, text));
    }
    text.parse::<i64>()
        .map_err(|_| PlaybookError::invalid_type(key, FieldKind::Integer, text))
}

/// Boolean kind: strict, case-sensitive `"true"` / `"false"`
///
/// # Errors
/// [`PlaybookError::InvalidType`] for any other literal
pub fn coerce_boolean(key: &str, raw: &Value) -> PlaybookResult<bool> {
    let text = scalar_text(key, FieldKind::Boolean, raw)?;
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(PlaybookError::invalid_type(key, FieldKind::Boolean, text)),
    }
}

/// ArrayOfString kind: comma-split text or a sequence of strings
///
/// # Errors
/// [`PlaybookError::InvalidType`] if a sequence element is not a string
pub fn coerce_string_array(key: &str, raw: &Value) -> PlaybookResult<Vec<String>> {
    match raw {
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(PlaybookError::invalid_type(
                    key,
                    FieldKind::ArrayOfString,
                    describe(other),
                )),
            })
            .collect(),
        other => {
            let text = scalar_text(key, FieldKind::ArrayOfString, other)?;
            Ok(split_list(text))
        }
    }
}

/// Split on `,` preserving order
///
/// Trailing empty segments are dropped, so `""` is an empty list and
/// `"a,b,"` is `["a", "b"]`. Interior empty segments are kept.
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    let mut items: Vec<String> = text.split(',').map(str::to_string).collect();
    while items.last().is_some_and(String::is_empty) {
        items.pop();
    }
    items
}

/// Lenient boolean: `"true"` is `true`, everything else is `false`
///
/// Never fails. Only for `Location.replace`; field assignment goes through
/// [`coerce_boolean`].
#[inline]
#[must_use]
pub fn parse_lenient_bool(raw: &str) -> bool {
    raw == "true"
}
