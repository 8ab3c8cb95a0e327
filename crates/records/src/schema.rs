//! Per-record-type field schemas.
//!
//! Every record type declares the fields it accepts. Updates naming an
//! unknown field, or carrying a value of the wrong shape, are rejected
//! before anything is written. `null` is accepted for every field.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    types::MEDIA_URL_FIELD,
};

/// Accepted shape of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// Absolute `http`/`https` URL.
    Url,
    Integer,
    Number,
    Bool,
    /// Any JSON value (objects and arrays included).
    Any,
}

impl FieldKind {
    fn check(self, value: &Value) -> std::result::Result<(), String> {
        if value.is_null() {
            return Ok(());
        }
        let ok = match self {
            Self::String => value.is_string(),
            Self::Url => {
                return match value.as_str() {
                    Some(s) => check_url(s),
                    None => Err(format!("expected URL string, got {}", kind_name(value))),
                };
            },
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("expected {self:?}, got {}", kind_name(value)).to_lowercase())
        }
    }
}

fn check_url(raw: &str) -> std::result::Result<(), String> {
    match url::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(format!("unsupported URL scheme {}://", url.scheme())),
        Err(e) => Err(format!("invalid URL: {e}")),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field declarations for one record type.
///
/// Every schema accepts [`MEDIA_URL_FIELD`] as a URL.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    record_type: String,
    fields: BTreeMap<String, FieldKind>,
}

impl RecordSchema {
    pub fn new(record_type: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(MEDIA_URL_FIELD.to_string(), FieldKind::Url);
        Self {
            record_type: record_type.into(),
            fields,
        }
    }

    /// Declare an additional field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Validate a set of field values (a full document or a patch).
    pub fn validate(&self, fields: &Map<String, Value>) -> Result<()> {
        for (name, value) in fields {
            let kind = self.fields.get(name).ok_or_else(|| {
                Error::validation(&self.record_type, name, "unknown field")
            })?;
            kind.check(value)
                .map_err(|message| Error::validation(&self.record_type, name, message))?;
        }
        Ok(())
    }
}

/// Lookup table of schemas by record type.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a schema.
    #[must_use]
    pub fn with(mut self, schema: RecordSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn register(&mut self, schema: RecordSchema) {
        self.schemas.insert(schema.record_type.clone(), schema);
    }

    pub fn get(&self, record_type: &str) -> Result<&RecordSchema> {
        self.schemas
            .get(record_type)
            .ok_or_else(|| Error::unknown_record_type(record_type))
    }
}
