use crate::catalog::TableRef;
use crate::error::Result;
use crate::source::{Row, RowSource, Selection};

use std::sync::Arc;

/// Every row read made while resolving a query goes through here
///
/// Each call is one read against the row source; nothing is batched or cached,
/// so a list of N rows with a lookup field costs N lookups.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn RowSource>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn RowSource>) -> Self {
        Self { source }
    }

    /// At most one row matching the selection
    pub async fn fetch_one(&self, table: &TableRef, selection: Selection) -> Result<Option<Row>> {
        tracing::debug!("Fetching one row of {}: {:?}", table, selection.conditions);
        let rows = self.source.select(table, &selection.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Every row matching the selection, in source order
    pub async fn fetch_many(&self, table: &TableRef, selection: Selection) -> Result<Vec<Row>> {
        tracing::debug!("Fetching rows of {}: {:?}", table, selection.conditions);
        let rows = self.source.select(table, &selection).await?;
        tracing::debug!("Fetched {} rows of {}", rows.len(), table);
        Ok(rows)
    }
}
