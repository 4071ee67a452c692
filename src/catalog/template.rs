/// URL templates for row link affordances
///
/// A template is a URL with `${column}` placeholders, e.g.
/// `/lists/details?id=${id}`. Placeholders are substituted from a row's values
/// (case-insensitive column match) and percent-encoded.

use crate::error::{Result, TablegraphError};
use crate::source::Row;

use async_graphql::Value;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters left untouched when substituting a value into a URL
const URL_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Column(String),
}

/// A parsed URL template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    /// Parse a template, rejecting unterminated or empty placeholders
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                TablegraphError::Config(format!("Unterminated placeholder in URL template '{}'", source))
            })?;
            let column = after[..end].trim();
            if column.is_empty() {
                return Err(TablegraphError::Config(format!(
                    "Empty placeholder in URL template '{}'",
                    source
                )));
            }
            segments.push(Segment::Column(column.to_string()));
            rest = &after[end + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Column names referenced by the template, in order of appearance
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Column(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Evaluate against a row
    ///
    /// Returns `None` when a referenced column is missing from the row or null.
    pub fn eval(&self, row: &Row) -> Option<String> {
        let mut href = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => href.push_str(text),
                Segment::Column(name) => {
                    let text = value_text(row.get(name)?)?;
                    href.extend(utf8_percent_encode(&text, URL_VALUE));
                }
            }
        }
        Some(href)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Enum(name) => Some(name.to_string()),
        other => Some(other.to_string()),
    }
}

impl TryFrom<String> for UrlTemplate {
    type Error = TablegraphError;

    fn try_from(source: String) -> Result<Self> {
        UrlTemplate::parse(&source)
    }
}

impl From<UrlTemplate> for String {
    fn from(template: UrlTemplate) -> Self {
        template.source
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::from_iter([
            ("RowId", Value::Number(15.into())),
            ("Name", Value::String("cell line/7".to_string())),
            ("Parent", Value::Null),
        ])
    }

    #[test]
    fn test_parse_and_eval() {
        let template = UrlTemplate::parse("/exp/details?rowId=${rowid}&name=${Name}").unwrap();
        assert_eq!(template.columns().collect::<Vec<_>>(), vec!["rowid", "Name"]);
        assert_eq!(
            template.eval(&row()).unwrap(),
            "/exp/details?rowId=15&name=cell%20line%2F7"
        );
    }

    #[test]
    fn test_literal_only_template() {
        let template = UrlTemplate::parse("/lists/grid").unwrap();
        assert_eq!(template.eval(&row()).unwrap(), "/lists/grid");
    }

    #[test]
    fn test_null_or_missing_value_skips() {
        let template = UrlTemplate::parse("/x?parent=${Parent}").unwrap();
        assert!(template.eval(&row()).is_none());

        let template = UrlTemplate::parse("/x?other=${Other}").unwrap();
        assert!(template.eval(&row()).is_none());
    }

    #[test]
    fn test_malformed_templates() {
        assert!(UrlTemplate::parse("/x?id=${id").is_err());
        assert!(UrlTemplate::parse("/x?id=${ }").is_err());
    }
}
