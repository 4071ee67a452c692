use async_graphql::{Name, Value};
use indexmap::IndexMap;

/// One row: column name → value, in source column order
///
/// Lookups fall back to a case-insensitive match because sources disagree on
/// column name casing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    /// Value of a column, exact name first, then case-insensitively
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column).or_else(|| {
            self.values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column))
                .map(|(_, value)| value)
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Keep only the named columns, in the order given
    pub fn project(&self, columns: &[String]) -> Row {
        columns
            .iter()
            .filter_map(|column| self.get(column).map(|value| (column.clone(), value.clone())))
            .collect()
    }

    /// The row as a GraphQL object value
    pub fn into_value(self) -> Value {
        Value::Object(
            self.values
                .into_iter()
                .map(|(name, value)| (Name::new(name), value))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Equality used by in-process filtering
///
/// Numbers and strings compare by their text so that an `ID` argument such as
/// `"7"` matches a stored integer `7`. Null never matches anything.
pub fn values_match(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        (Value::String(a), Value::String(b)) => a == b,
        (a, b) => a == b,
    }
}
