/// Field resolvers for table object types
///
/// Each column field resolves against its parent `Row`:
/// - plain columns return the stored value
/// - single-valued foreign keys fetch the one target row
/// - multi-valued foreign keys fetch the target rows through the junction table
///
/// Resolution is lazy: nothing is read until the field is requested.

use crate::catalog::TableRef;
use crate::error::Result;
use crate::schema::fetch::Fetcher;
use crate::source::{Row, Selection};

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use async_graphql::Value;
use std::sync::Arc;

/// How a column field produces its value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldResolution {
    /// The stored value as is
    Passthrough,

    /// The stored value as a one-element list; a multi-valued foreign key
    /// whose target cannot be found
    PassthroughList,

    /// The row of `table` whose `column` equals the stored value
    Lookup { table: TableRef, column: String },

    /// Rows of `target` whose `target_column` is in
    /// `SELECT junction_lookup FROM junction WHERE junction_key = <source_column value>`
    Junction {
        source_column: String,
        target: TableRef,
        target_column: String,
        junction: TableRef,
        junction_key: String,
        junction_lookup: String,
    },
}

/// A resolved field value
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Null,
    Scalar(Value),
    Scalars(Vec<Value>),
    Row(Row),
    Rows(Vec<Row>),
}

impl Resolved {
    fn into_field_value<'a>(self) -> Option<FieldValue<'a>> {
        match self {
            Resolved::Null => None,
            Resolved::Scalar(value) => Some(FieldValue::value(value)),
            Resolved::Scalars(values) => {
                Some(FieldValue::list(values.into_iter().map(FieldValue::value)))
            }
            Resolved::Row(row) => Some(FieldValue::owned_any(row)),
            Resolved::Rows(rows) => Some(FieldValue::list(rows.into_iter().map(FieldValue::owned_any))),
        }
    }
}

/// Resolve one column of one row
///
/// A null stored value never touches the row source: single-valued fields
/// resolve to null and multi-valued fields to an empty list.
pub async fn resolve(
    column: &str,
    resolution: &FieldResolution,
    row: &Row,
    fetcher: &Fetcher,
) -> Result<Resolved> {
    let key_column = match resolution {
        FieldResolution::Junction { source_column, .. } => source_column.as_str(),
        _ => column,
    };

    let stored = match row.get(key_column) {
        Some(Value::Null) | None => {
            return Ok(match resolution {
                FieldResolution::Junction { .. } => Resolved::Rows(Vec::new()),
                FieldResolution::PassthroughList => Resolved::Scalars(Vec::new()),
                _ => Resolved::Null,
            });
        }
        Some(value) => value.clone(),
    };

    match resolution {
        FieldResolution::Passthrough => Ok(Resolved::Scalar(stored)),
        FieldResolution::PassthroughList => Ok(Resolved::Scalars(vec![stored])),
        FieldResolution::Lookup { table, column } => {
            let selection = Selection::new().where_eq(column.as_str(), stored);
            Ok(match fetcher.fetch_one(table, selection).await? {
                Some(row) => Resolved::Row(row),
                None => Resolved::Null,
            })
        }
        FieldResolution::Junction {
            target,
            target_column,
            junction,
            junction_key,
            junction_lookup,
            ..
        } => {
            let selection = Selection::new().where_in_select(
                target_column.as_str(),
                junction.clone(),
                junction_lookup.as_str(),
                junction_key.as_str(),
                stored,
            );
            Ok(Resolved::Rows(fetcher.fetch_many(target, selection).await?))
        }
    }
}

/// Resolver closure for one column field
pub fn column_resolver(
    column: impl Into<String>,
    resolution: FieldResolution,
) -> impl for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static {
    let column = column.into();
    let resolution = Arc::new(resolution);

    move |ctx: ResolverContext| {
        let column = column.clone();
        let resolution = Arc::clone(&resolution);

        FieldFuture::new(async move {
            let row = ctx.parent_value.try_downcast_ref::<Row>()?;
            let fetcher = ctx.data::<Fetcher>()?;

            let resolved = resolve(&column, &resolution, row, fetcher).await?;
            Ok(resolved.into_field_value())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryRowSource;

    fn num(n: i64) -> Value {
        Value::Number(n.into())
    }

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    fn source() -> Arc<MemoryRowSource> {
        Arc::new(
            MemoryRowSource::new()
                .with_table(
                    TableRef::new("core", "Users"),
                    vec![Row::from_iter([("UserId", num(7)), ("DisplayName", text("bob"))])],
                )
                .with_table(
                    TableRef::new("lists", "Tag"),
                    vec![
                        Row::from_iter([("id", num(1)), ("name", text("red"))]),
                        Row::from_iter([("id", num(2)), ("name", text("blue"))]),
                    ],
                )
                .with_table(
                    TableRef::new("lists", "ItemTags"),
                    vec![
                        Row::from_iter([("itemId", num(10)), ("tagId", num(2))]),
                        Row::from_iter([("itemId", num(10)), ("tagId", num(1))]),
                    ],
                ),
        )
    }

    fn lookup() -> FieldResolution {
        FieldResolution::Lookup {
            table: TableRef::new("core", "Users"),
            column: "UserId".to_string(),
        }
    }

    fn junction() -> FieldResolution {
        FieldResolution::Junction {
            source_column: "id".to_string(),
            target: TableRef::new("lists", "Tag"),
            target_column: "id".to_string(),
            junction: TableRef::new("lists", "ItemTags"),
            junction_key: "itemId".to_string(),
            junction_lookup: "tagId".to_string(),
        }
    }

    #[tokio::test]
    async fn test_passthrough_is_case_insensitive() {
        let fetcher = Fetcher::new(source());
        let row = Row::from_iter([("Name", text("widget"))]);

        let resolved = resolve("name", &FieldResolution::Passthrough, &row, &fetcher)
            .await
            .unwrap();
        assert_eq!(resolved, Resolved::Scalar(text("widget")));
    }

    #[tokio::test]
    async fn test_lookup_fetches_target_row() {
        let source = source();
        let fetcher = Fetcher::new(source.clone());
        let row = Row::from_iter([("CreatedBy", num(7))]);

        let resolved = resolve("CreatedBy", &lookup(), &row, &fetcher).await.unwrap();
        match resolved {
            Resolved::Row(user) => assert_eq!(user.get("DisplayName"), Some(&text("bob"))),
            other => panic!("Expected a row, got {:?}", other),
        }
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test]
    async fn test_lookup_without_match_is_null() {
        let fetcher = Fetcher::new(source());
        let row = Row::from_iter([("CreatedBy", num(99))]);

        let resolved = resolve("CreatedBy", &lookup(), &row, &fetcher).await.unwrap();
        assert_eq!(resolved, Resolved::Null);
    }

    #[tokio::test]
    async fn test_null_value_skips_fetch() {
        let source = source();
        let fetcher = Fetcher::new(source.clone());
        let row = Row::from_iter([("CreatedBy", Value::Null), ("id", Value::Null)]);

        assert_eq!(
            resolve("CreatedBy", &lookup(), &row, &fetcher).await.unwrap(),
            Resolved::Null
        );
        assert_eq!(
            resolve("id", &junction(), &row, &fetcher).await.unwrap(),
            Resolved::Rows(Vec::new())
        );
        assert_eq!(source.reads(), 0);
    }

    #[tokio::test]
    async fn test_junction_returns_rows_in_target_order() {
        let source = source();
        let fetcher = Fetcher::new(source.clone());
        let row = Row::from_iter([("id", num(10))]);

        match resolve("id", &junction(), &row, &fetcher).await.unwrap() {
            Resolved::Rows(tags) => {
                let names: Vec<_> = tags.iter().filter_map(|t| t.get("name").cloned()).collect();
                assert_eq!(names, vec![text("red"), text("blue")]);
            }
            other => panic!("Expected rows, got {:?}", other),
        }
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test]
    async fn test_junction_keys_off_source_column() {
        let source = source();
        let fetcher = Fetcher::new(source.clone());
        let row = Row::from_iter([("id", num(10)), ("tags", Value::Null)]);

        match resolve("tags", &junction(), &row, &fetcher).await.unwrap() {
            Resolved::Rows(tags) => assert_eq!(tags.len(), 2),
            other => panic!("Expected rows, got {:?}", other),
        }
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test]
    async fn test_passthrough_list() {
        let source = source();
        let fetcher = Fetcher::new(source.clone());

        let row = Row::from_iter([("tags", num(4))]);
        assert_eq!(
            resolve("tags", &FieldResolution::PassthroughList, &row, &fetcher)
                .await
                .unwrap(),
            Resolved::Scalars(vec![num(4)])
        );

        let row = Row::from_iter([("tags", Value::Null)]);
        assert_eq!(
            resolve("tags", &FieldResolution::PassthroughList, &row, &fetcher)
                .await
                .unwrap(),
            Resolved::Scalars(Vec::new())
        );
        assert_eq!(source.reads(), 0);
    }
}
