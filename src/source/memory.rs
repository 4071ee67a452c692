use crate::catalog::TableRef;
use crate::error::{Result, TablegraphError};
use crate::source::{values_match, Condition, Row, RowSource, Selection};

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rows held in process, keyed by table
///
/// Counts every `select` so callers can observe how many reads a query made.
#[derive(Debug, Default)]
pub struct MemoryRowSource {
    tables: IndexMap<TableRef, Vec<Row>>,
    reads: AtomicUsize,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableRef, rows: Vec<Row>) -> Self {
        self.insert(table, rows);
        self
    }

    /// Add or replace a table's rows
    pub fn insert(&mut self, table: TableRef, rows: Vec<Row>) {
        self.tables.insert(table, rows);
    }

    /// Number of reads served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn rows(&self, table: &TableRef) -> Result<&[Row]> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| TablegraphError::Source(format!("No rows registered for table '{}'", table)))
    }

    fn matches(&self, row: &Row, condition: &Condition) -> Result<bool> {
        match condition {
            Condition::Eq { column, value } => {
                Ok(row.get(column).is_some_and(|stored| values_match(stored, value)))
            }
            Condition::InSelect {
                column,
                table,
                select,
                key,
                value,
            } => {
                let Some(stored) = row.get(column) else {
                    return Ok(false);
                };
                let found = self.rows(table)?.iter().any(|junction| {
                    junction.get(key).is_some_and(|k| values_match(k, value))
                        && junction.get(select).is_some_and(|s| values_match(s, stored))
                });
                Ok(found)
            }
        }
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn select(&self, table: &TableRef, selection: &Selection) -> Result<Vec<Row>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut selected = Vec::new();
        for row in self.rows(table)? {
            if let Some(limit) = selection.limit {
                if selected.len() >= limit {
                    break;
                }
            }

            let mut keep = true;
            for condition in &selection.conditions {
                if !self.matches(row, condition)? {
                    keep = false;
                    break;
                }
            }

            if keep {
                selected.push(match &selection.columns {
                    Some(columns) => row.project(columns),
                    None => row.clone(),
                });
            }
        }

        tracing::trace!("Memory source read {} rows from {}", selected.len(), table);
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    fn tag(id: i64, name: &str) -> Row {
        Row::from_iter([
            ("id", Value::Number(id.into())),
            ("name", Value::String(name.to_string())),
        ])
    }

    fn link(item: i64, tag: i64) -> Row {
        Row::from_iter([
            ("itemId", Value::Number(item.into())),
            ("tagId", Value::Number(tag.into())),
        ])
    }

    fn source() -> MemoryRowSource {
        MemoryRowSource::new()
            .with_table(
                TableRef::new("lists", "Tag"),
                vec![tag(1, "red"), tag(2, "blue"), tag(3, "green")],
            )
            .with_table(
                TableRef::new("lists", "ItemTags"),
                vec![link(10, 1), link(10, 3), link(11, 2)],
            )
    }

    #[tokio::test]
    async fn test_select_eq() {
        let source = source();
        let rows = source
            .select(
                &TableRef::new("lists", "Tag"),
                &Selection::new().where_eq("id", Value::String("2".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::String("blue".to_string())));
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test]
    async fn test_select_in_junction() {
        let rows = source()
            .select(
                &TableRef::new("lists", "Tag"),
                &Selection::new().where_in_select(
                    "id",
                    TableRef::new("lists", "ItemTags"),
                    "tagId",
                    "itemId",
                    Value::Number(10.into()),
                ),
            )
            .await
            .unwrap();

        let names: Vec<_> = rows.iter().filter_map(|r| r.get("name").cloned()).collect();
        assert_eq!(
            names,
            vec![Value::String("red".to_string()), Value::String("green".to_string())]
        );
    }

    #[tokio::test]
    async fn test_select_projection_and_limit() {
        let rows = source()
            .select(
                &TableRef::new("lists", "Tag"),
                &Selection::new().columns(["name"]).limit(2),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
        assert!(rows[0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let result = source()
            .select(&TableRef::new("lists", "Nope"), &Selection::new())
            .await;
        assert!(matches!(result, Err(TablegraphError::Source(_))));
    }
}
