use serde_json::{Map, Value};

use crate::models::errors::FormatError;

static NULL: Value = Value::Null;

/// Anything that turns one raw JSON value into a typed value or fails.
pub trait Formatter<T>: Fn(&Value) -> Result<T, FormatError> + Send + Sync {}

impl<T, F> Formatter<T> for F where F: Fn(&Value) -> Result<T, FormatError> + Send + Sync {}

/// Alternate source names for one output field, tried in order when the canonical
/// name is missing from the record.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

pub type AliasMap = &'static [FieldAliases];

/// Returns `default` for `null` or missing values without calling `format`.
///
/// With `None` as the default the output is an `Option`; with a concrete value (e.g.
/// `0u64`) missing fields resolve to that value instead.
pub fn allow_null<T, D>(format: impl Formatter<T>, default: D) -> impl Formatter<D>
where
    T: Into<D>,
    D: Clone + Send + Sync,
{
    move |value: &Value| {
        if value.is_null() {
            return Ok(default.clone());
        }
        format(value).map(Into::into)
    }
}

pub fn array_of<T>(format: impl Formatter<T>) -> impl Formatter<Vec<T>> {
    move |value: &Value| match value {
        Value::Array(items) => items.iter().map(|item| format(item)).collect(),
        _ => Err(FormatError::NotAnArray {
            value: value.clone(),
        }),
    }
}

/// Read access to one raw record, handed to the builder closure of [`object`].
pub struct RecordReader<'a> {
    raw: &'a Value,
    record: &'a Map<String, Value>,
    aliases: AliasMap,
}

impl<'a> RecordReader<'a> {
    /// The key `field` is read from: the canonical name when present, otherwise the
    /// first listed alias that is present, otherwise the canonical name again.
    pub fn source_key<'k>(&self, field: &'k str) -> &'k str {
        if self.record.contains_key(field) {
            return field;
        }
        self.aliases
            .iter()
            .find(|entry| entry.field == field)
            .and_then(|entry| {
                entry
                    .aliases
                    .iter()
                    .copied()
                    .find(|alias| self.record.contains_key(*alias))
            })
            .unwrap_or(field)
    }

    /// Formats one field. Any failure is re-raised as `BadData` naming `field` and
    /// carrying the whole record.
    pub fn field<T>(&self, field: &str, format: impl Formatter<T>) -> Result<T, FormatError> {
        let value = self.record.get(self.source_key(field)).unwrap_or(&NULL);
        format(value).map_err(|error| FormatError::BadData {
            field: field.to_string(),
            source: Box::new(error),
            value: Box::new(self.raw.clone()),
        })
    }
}

/// Builds a formatter for a JSON object. `build` reads the fields in its own
/// declaration order, so the first failing field aborts the whole conversion.
pub fn object<T, B>(aliases: AliasMap, build: B) -> impl Formatter<T>
where
    B: Fn(&RecordReader<'_>) -> Result<T, FormatError> + Send + Sync,
{
    move |value: &Value| {
        let record = value.as_object().ok_or_else(|| FormatError::NotAnObject {
            value: value.clone(),
        })?;
        build(&RecordReader {
            raw: value,
            record,
            aliases,
        })
    }
}
