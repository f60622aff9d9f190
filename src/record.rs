use crate::error::{LedgerError, LedgerResult, EMPTY_OR_INVALID_INPUT};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Scalar stored in a single cell.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl CellValue {
    /// Text written to the sheet for this value. `Null` becomes the empty placeholder.
    pub fn to_cell_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    fn from_scalar(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(CellValue::Null),
            Value::Bool(b) => Some(CellValue::Bool(b)),
            Value::Number(n) => Some(CellValue::Number(n)),
            Value::String(s) => Some(CellValue::Text(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// A field-keyed record. Key order is the order fields were inserted, which
/// becomes the column order when the record bootstraps an empty table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document into a record, rejecting anything that is not an
    /// object of scalar values.
    pub fn from_json(json: &str) -> LedgerResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|_| LedgerError::invalid_input(EMPTY_OR_INVALID_INPUT))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> LedgerResult<Self> {
        let Value::Object(map) = value else {
            return Err(LedgerError::invalid_input(EMPTY_OR_INVALID_INPUT));
        };
        let mut fields = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            let cell = CellValue::from_scalar(value).ok_or_else(|| {
                LedgerError::invalid_input(format!(
                    "{}: field '{}' is not a scalar",
                    EMPTY_OR_INVALID_INPUT, key
                ))
            })?;
            fields.insert(key, cell);
        }
        Ok(Self { fields })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text of a field, or `None` when absent.
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(CellValue::to_cell_text)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
