/// DataFusion-backed row source
///
/// Tables are registered in a `SessionContext` from CSV files, Parquet files or
/// Delta tables, and every `Selection` is rendered as one SQL statement.

use crate::catalog::{Catalog, TableRef};
use crate::error::{Result, TablegraphError};
use crate::source::{Condition, Row, RowSource, Selection};

use async_graphql::Value;
use async_trait::async_trait;
use datafusion::arrow::array::*;
use datafusion::arrow::datatypes::DataType as ArrowDataType;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::arrow::util::display::array_value_to_string;
use datafusion::prelude::*;
use std::sync::Arc;

/// Row source over a DataFusion session
pub struct SessionSource {
    /// DataFusion session context for query execution
    datafusion_ctx: SessionContext,
}

impl SessionSource {
    pub fn new() -> Self {
        Self::with_context(SessionContext::new())
    }

    pub fn with_context(datafusion_ctx: SessionContext) -> Self {
        Self { datafusion_ctx }
    }

    pub fn context(&self) -> &SessionContext {
        &self.datafusion_ctx
    }

    /// Register a table from a file path
    ///
    /// `.csv` and `.parquet` files are read directly; anything else is opened
    /// as a Delta table.
    pub async fn register_table_from_path(&self, table: &TableRef, path: &str) -> Result<()> {
        let name = table.source_name();

        if path.ends_with(".csv") {
            self.datafusion_ctx
                .register_csv(name.as_str(), path, CsvReadOptions::new())
                .await
                .map_err(|e| TablegraphError::Source(format!("Failed to register CSV '{}': {}", path, e)))?;
        } else if path.ends_with(".parquet") {
            self.datafusion_ctx
                .register_parquet(name.as_str(), path, ParquetReadOptions::default())
                .await
                .map_err(|e| {
                    TablegraphError::Source(format!("Failed to register Parquet '{}': {}", path, e))
                })?;
        } else {
            let delta_table = deltalake::open_table(path).await?;

            self.datafusion_ctx
                .register_table(name.as_str(), Arc::new(delta_table))
                .map_err(|e| {
                    TablegraphError::Source(format!("Failed to register Delta table '{}': {}", table, e))
                })?;
        }

        tracing::info!("Registered {} from {} as '{}'", table, path, name);
        Ok(())
    }

    /// Register every catalog table that has a data location
    pub async fn register_catalog(&self, catalog: &Catalog) -> Result<usize> {
        let mut registered = 0;
        for (table, path) in catalog.data_locations() {
            let path = path.to_string_lossy();
            self.register_table_from_path(table, &path).await?;
            registered += 1;
        }
        Ok(registered)
    }
}

impl SessionSource {
    /// Column names of a registered table as the engine knows them
    async fn column_names(&self, table: &TableRef) -> Result<Vec<String>> {
        let df = self.datafusion_ctx.table(table.source_name().as_str()).await?;
        Ok(df.schema().fields().iter().map(|f| f.name().clone()).collect())
    }

    /// Rewrite every column of `selection` to the engine's spelling
    ///
    /// Catalog names may differ in case from the data; SQL identifiers are
    /// quoted, so they have to match exactly.
    async fn resolve_columns(&self, table: &TableRef, selection: &Selection) -> Result<Selection> {
        let columns = self.column_names(table).await?;
        let mut resolved = selection.clone();

        if let Some(projection) = &mut resolved.columns {
            for column in projection.iter_mut() {
                *column = match_column(&columns, column);
            }
        }

        for condition in &mut resolved.conditions {
            match condition {
                Condition::Eq { column, .. } => *column = match_column(&columns, column),
                Condition::InSelect {
                    column,
                    table: junction,
                    select,
                    key,
                    ..
                } => {
                    *column = match_column(&columns, column);
                    let junction_columns = self.column_names(junction).await?;
                    *select = match_column(&junction_columns, select);
                    *key = match_column(&junction_columns, key);
                }
            }
        }

        Ok(resolved)
    }
}

/// Exact name first, then a case-insensitive match; unknown names are kept
/// so the engine reports them
fn match_column(columns: &[String], name: &str) -> String {
    columns
        .iter()
        .find(|c| c.as_str() == name)
        .or_else(|| columns.iter().find(|c| c.eq_ignore_ascii_case(name)))
        .cloned()
        .unwrap_or_else(|| name.to_string())
}

impl Default for SessionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowSource for SessionSource {
    async fn select(&self, table: &TableRef, selection: &Selection) -> Result<Vec<Row>> {
        let selection = self.resolve_columns(table, selection).await?;
        let sql = select_sql(table, &selection)?;
        tracing::debug!("Executing query: {}", sql);

        let df = self.datafusion_ctx.sql(&sql).await?;
        let batches = df.collect().await?;

        let mut rows = Vec::new();
        for batch in &batches {
            rows.extend(record_batch_to_rows(batch)?);
        }
        Ok(rows)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Boolean(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
        Value::Enum(name) => Ok(format!("'{}'", name.as_str().replace('\'', "''"))),
        other => Err(TablegraphError::Source(format!(
            "Cannot filter on value {}",
            other
        ))),
    }
}

/// Render a selection as SQL against the table's registered name
pub fn select_sql(table: &TableRef, selection: &Selection) -> Result<String> {
    let projection = match &selection.columns {
        Some(columns) if !columns.is_empty() => columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "*".to_string(),
    };

    let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(&table.source_name()));

    let mut predicates = Vec::with_capacity(selection.conditions.len());
    for condition in &selection.conditions {
        predicates.push(match condition {
            Condition::Eq { column, value } => {
                format!("{} = {}", quote_ident(column), literal(value)?)
            }
            Condition::InSelect {
                column,
                table,
                select,
                key,
                value,
            } => format!(
                "{} IN (SELECT {} FROM {} WHERE {} = {})",
                quote_ident(column),
                quote_ident(select),
                quote_ident(&table.source_name()),
                quote_ident(key),
                literal(value)?
            ),
        });
    }

    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    if let Some(limit) = selection.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    Ok(sql)
}

fn downcast<'a, T: 'static>(column: &'a ArrayRef, name: &str) -> Result<&'a T> {
    column.as_any().downcast_ref::<T>().ok_or_else(|| {
        TablegraphError::Source(format!(
            "Column '{}' does not match its declared type {:?}",
            name,
            column.data_type()
        ))
    })
}

fn number_from_f64(f: f64, name: &str) -> Result<Value> {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| TablegraphError::Source(format!("Invalid float value in column '{}'", name)))
}

/// Convert every row of a RecordBatch
pub fn record_batch_to_rows(batch: &RecordBatch) -> Result<Vec<Row>> {
    (0..batch.num_rows())
        .map(|row_idx| record_batch_row(batch, row_idx))
        .collect()
}

/// Convert a single row of a RecordBatch
///
/// Dates and timestamps become ISO 8601 strings; types without a direct
/// GraphQL value are rendered with Arrow's display formatting.
fn record_batch_row(batch: &RecordBatch, row_idx: usize) -> Result<Row> {
    let schema = batch.schema();
    let mut row = Row::new();

    for (col_idx, field) in schema.fields().iter().enumerate() {
        let column = batch.column(col_idx);
        let name = field.name();

        if column.is_null(row_idx) {
            row.insert(name.as_str(), Value::Null);
            continue;
        }

        let value = match column.data_type() {
            ArrowDataType::Int8 => {
                Value::Number(downcast::<Int8Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::Int16 => {
                Value::Number(downcast::<Int16Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::Int32 => {
                Value::Number(downcast::<Int32Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::Int64 => {
                Value::Number(downcast::<Int64Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::UInt8 => {
                Value::Number(downcast::<UInt8Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::UInt16 => {
                Value::Number(downcast::<UInt16Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::UInt32 => {
                Value::Number(downcast::<UInt32Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::UInt64 => {
                Value::Number(downcast::<UInt64Array>(column, name)?.value(row_idx).into())
            }
            ArrowDataType::Float32 => {
                number_from_f64(downcast::<Float32Array>(column, name)?.value(row_idx) as f64, name)?
            }
            ArrowDataType::Float64 => {
                number_from_f64(downcast::<Float64Array>(column, name)?.value(row_idx), name)?
            }
            ArrowDataType::Utf8 => {
                Value::String(downcast::<StringArray>(column, name)?.value(row_idx).to_string())
            }
            ArrowDataType::LargeUtf8 => {
                Value::String(downcast::<LargeStringArray>(column, name)?.value(row_idx).to_string())
            }
            ArrowDataType::Boolean => {
                Value::Boolean(downcast::<BooleanArray>(column, name)?.value(row_idx))
            }
            ArrowDataType::Timestamp(unit, _tz) => {
                use chrono::{DateTime, Utc};
                use datafusion::arrow::datatypes::TimeUnit;

                let (raw, datetime) = match unit {
                    TimeUnit::Second => {
                        let v = downcast::<TimestampSecondArray>(column, name)?.value(row_idx);
                        (v, DateTime::<Utc>::from_timestamp(v, 0))
                    }
                    TimeUnit::Millisecond => {
                        let v = downcast::<TimestampMillisecondArray>(column, name)?.value(row_idx);
                        (v, DateTime::<Utc>::from_timestamp_millis(v))
                    }
                    TimeUnit::Microsecond => {
                        let v = downcast::<TimestampMicrosecondArray>(column, name)?.value(row_idx);
                        (v, DateTime::<Utc>::from_timestamp_micros(v))
                    }
                    TimeUnit::Nanosecond => {
                        let v = downcast::<TimestampNanosecondArray>(column, name)?.value(row_idx);
                        (v, Some(DateTime::<Utc>::from_timestamp_nanos(v)))
                    }
                };

                let datetime = datetime.ok_or_else(|| {
                    TablegraphError::Source(format!(
                        "Invalid timestamp {} ({:?}) in column '{}'",
                        raw, unit, name
                    ))
                })?;
                Value::String(datetime.to_rfc3339())
            }
            ArrowDataType::Date32 => {
                let days = downcast::<Date32Array>(column, name)?.value(row_idx);

                use chrono::NaiveDate;
                let date = NaiveDate::from_ymd_opt(1970, 1, 1)
                    .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days as i64)))
                    .ok_or_else(|| TablegraphError::Source(format!("Invalid date: {} days", days)))?;

                Value::String(date.format("%Y-%m-%d").to_string())
            }
            ArrowDataType::Date64 => {
                let millis = downcast::<Date64Array>(column, name)?.value(row_idx);

                use chrono::NaiveDate;
                let date = NaiveDate::from_ymd_opt(1970, 1, 1)
                    .and_then(|epoch| {
                        epoch.checked_add_signed(chrono::Duration::milliseconds(millis))
                    })
                    .ok_or_else(|| TablegraphError::Source(format!("Invalid date: {} ms", millis)))?;

                Value::String(date.format("%Y-%m-%d").to_string())
            }
            other => {
                tracing::trace!("Rendering {:?} column '{}' as text", other, name);
                let text = array_value_to_string(column, row_idx).map_err(|e| {
                    TablegraphError::Source(format!("Failed to render column '{}': {}", name, e))
                })?;
                Value::String(text)
            }
        };

        row.insert(name.as_str(), value);
    }

    Ok(row)
}
