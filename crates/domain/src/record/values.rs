//! Positional construction of record payloads.
//!
//! Every payload type declares a fixed shape: the ordered list of fields it is
//! built from and the kind of value each position must hold. Construction
//! validates arity and every position against that shape before any field is
//! read, so a failed construction never yields a partially populated value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// An untyped positional value.
///
/// `Null` stands for a missing value: numeric fields default to `0`, string
/// and list fields stay unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    fn describe(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Integer(_) => "integer",
            FieldValue::Text(_) => "string",
            FieldValue::List(_) => "list",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// The kind of value a shape position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    TextList,
}

impl FieldKind {
    fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (_, FieldValue::Null) => true,
            (FieldKind::Text, FieldValue::Text(_)) => true,
            (FieldKind::Int, FieldValue::Integer(v)) => i32::try_from(*v).is_ok(),
            (FieldKind::Long, FieldValue::Integer(_)) => true,
            (FieldKind::TextList, FieldValue::List(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "string",
            FieldKind::Int => "int",
            FieldKind::Long => "int64",
            FieldKind::TextList => "list of strings",
        };
        write!(f, "{}", name)
    }
}

/// A payload type constructible from positional values.
pub trait PositionalData: Sized {
    /// Type name used in error messages.
    const TYPE_NAME: &'static str;

    /// Ordered `(field name, kind)` pairs.
    const SHAPE: &'static [(&'static str, FieldKind)];

    /// Reads the fields in shape order. Only called after the values were
    /// validated against [`Self::SHAPE`].
    fn read(fields: &mut FieldReader<'_>) -> Self;

    fn from_values(values: &[FieldValue]) -> Result<Self, DomainError> {
        validate_shape(Self::TYPE_NAME, Self::SHAPE, values)?;
        Ok(Self::read(&mut FieldReader::new(values)))
    }
}

fn validate_shape(
    type_name: &str,
    shape: &[(&'static str, FieldKind)],
    values: &[FieldValue],
) -> Result<(), DomainError> {
    if values.len() != shape.len() {
        return Err(DomainError::InvalidRecordData(format!(
            "{} expects {} values, got {}",
            type_name,
            shape.len(),
            values.len()
        )));
    }

    for (position, ((field, kind), value)) in shape.iter().zip(values).enumerate() {
        if !kind.accepts(value) {
            return Err(DomainError::InvalidRecordData(format!(
                "{} field '{}' at position {} expects {}, got {}",
                type_name,
                field,
                position,
                kind,
                value.describe()
            )));
        }
    }

    Ok(())
}

/// Sequential reader over values already validated against a shape.
pub struct FieldReader<'a> {
    values: std::slice::Iter<'a, FieldValue>,
}

impl<'a> FieldReader<'a> {
    fn new(values: &'a [FieldValue]) -> Self {
        Self {
            values: values.iter(),
        }
    }

    pub fn text(&mut self) -> Option<String> {
        match self.values.next() {
            Some(FieldValue::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn int(&mut self) -> i32 {
        match self.values.next() {
            Some(FieldValue::Integer(v)) => i32::try_from(*v).unwrap_or_default(),
            _ => 0,
        }
    }

    pub fn long(&mut self) -> i64 {
        match self.values.next() {
            Some(FieldValue::Integer(v)) => *v,
            _ => 0,
        }
    }

    pub fn text_list(&mut self) -> Option<Vec<String>> {
        match self.values.next() {
            Some(FieldValue::List(items)) => Some(items.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        label: Option<String>,
        weight: i32,
    }

    impl PositionalData for Pair {
        const TYPE_NAME: &'static str = "PAIR";
        const SHAPE: &'static [(&'static str, FieldKind)] =
            &[("label", FieldKind::Text), ("weight", FieldKind::Int)];

        fn read(fields: &mut FieldReader<'_>) -> Self {
            Self {
                label: fields.text(),
                weight: fields.int(),
            }
        }
    }

    #[test]
    fn test_null_defaults() {
        let pair = Pair::from_values(&[FieldValue::Null, FieldValue::Null]).unwrap();
        assert_eq!(pair.label, None);
        assert_eq!(pair.weight, 0);
    }

    #[test]
    fn test_int_range_is_checked() {
        let err = Pair::from_values(&["x".into(), FieldValue::Integer(i64::from(i32::MAX) + 1)])
            .err()
            .unwrap();
        assert!(err.to_string().contains("weight"));
    }

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"["mail", 10, null, ["a", "b"]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Text("mail".into()),
                FieldValue::Integer(10),
                FieldValue::Null,
                FieldValue::List(vec!["a".into(), "b".into()]),
            ]
        );
    }
}
