//! Row sources: where resolvers read rows from
//!
//! A `RowSource` answers one `Selection` against one table. Two are provided:
//! `MemoryRowSource` for rows held in process and `SessionSource` for tables
//! registered in a DataFusion session (CSV, Parquet or Delta).

mod memory;
mod row;
mod session;

pub use memory::MemoryRowSource;
pub use row::{values_match, Row};
pub use session::{record_batch_to_rows, SessionSource};

use crate::catalog::TableRef;
use crate::error::Result;

use async_graphql::Value;
use async_trait::async_trait;

/// One conjunct of a selection filter
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Eq { column: String, value: Value },

    /// `column IN (SELECT select FROM table WHERE key = value)`
    InSelect {
        column: String,
        table: TableRef,
        select: String,
        key: String,
        value: Value,
    },
}

/// Filter, projection and limit for one read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub conditions: Vec<Condition>,
    pub columns: Option<Vec<String>>,
    pub limit: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::Eq {
            column: column.into(),
            value,
        });
        self
    }

    pub fn where_in_select(
        mut self,
        column: impl Into<String>,
        table: TableRef,
        select: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Self {
        self.conditions.push(Condition::InSelect {
            column: column.into(),
            table,
            select: select.into(),
            key: key.into(),
            value,
        });
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Reads rows for the resolvers
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Rows of `table` matching every condition, in source order
    async fn select(&self, table: &TableRef, selection: &Selection) -> Result<Vec<Row>>;
}
