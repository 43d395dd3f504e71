//! Records produced by the assembler.
//!
//! A [`Record`] keeps its fields in rule-declaration order and serializes as
//! a JSON object in that order, so responses read the same way the rule set
//! is written.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Details(BTreeMap<String, String>),
    Records(Vec<Record>),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_details(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            FieldValue::Details(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            FieldValue::Records(records) => Some(records),
            _ => None,
        }
    }

    /// `true` for an empty string, details map or record list. Flags are
    /// never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Flag(_) => false,
            FieldValue::Details(map) => map.is_empty(),
            FieldValue::Records(records) => records.is_empty(),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Flag(b) => serializer.serialize_bool(*b),
            FieldValue::Details(map) => map.serialize(serializer),
            FieldValue::Records(records) => records.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: &'static str,
    value: FieldValue,
    omit_if_empty: bool,
}

/// One extracted entity: every field its rule set declares, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: FieldValue, omit_if_empty: bool) {
        self.fields.push(Field {
            name,
            value,
            omit_if_empty,
        });
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// Text value of `name`, or `""` when the field is missing or not text.
    #[must_use]
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let visible = self
            .fields
            .iter()
            .filter(|f| !(f.omit_if_empty && f.value.is_empty()));
        let mut map = serializer.serialize_map(None)?;
        for field in visible {
            map.serialize_entry(field.name, &field.value)?;
        }
        map.end()
    }
}
