//! Request execution: build the schema for the requested table, run the
//! document, return the data or the first error.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Result, TablegraphError};
use crate::schema::{Fetcher, SchemaBuilder};
use crate::source::{RowSource, SessionSource};

use async_graphql::Variables;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// One query request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Schema holding the root table
    pub schema_name: String,
    /// Root table name; also the name of the `Query` field
    pub query_name: String,
    /// GraphQL document
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

impl QueryRequest {
    pub fn new(
        schema_name: impl Into<String>,
        query_name: impl Into<String>,
        q: impl Into<String>,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            query_name: query_name.into(),
            q: q.into(),
            variables: None,
        }
    }

    pub fn variables(mut self, variables: serde_json::Value) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Executes requests against a metadata provider and a row source
///
/// A fresh schema is compiled for every request.
#[derive(Clone)]
pub struct QueryService {
    builder: SchemaBuilder,
    fetcher: Fetcher,
}

impl QueryService {
    pub fn new(builder: SchemaBuilder, source: Arc<dyn RowSource>) -> Self {
        Self {
            builder,
            fetcher: Fetcher::new(source),
        }
    }

    /// Catalog, schema options and a DataFusion source with every configured table registered
    pub async fn from_config(config: &Config, base_dir: Option<&Path>) -> Result<Self> {
        let catalog = Catalog::from_config(config, base_dir)?;

        let source = SessionSource::new();
        let registered = source.register_catalog(&catalog).await?;
        tracing::info!("Registered {} tables with the query engine", registered);

        let builder = SchemaBuilder::from_config(Arc::new(catalog), config);
        Ok(Self::new(builder, Arc::new(source)))
    }

    pub fn builder(&self) -> &SchemaBuilder {
        &self.builder
    }

    /// Generated SDL for a table's schema
    pub fn sdl(&self, schema_name: &str, query_name: &str) -> Result<String> {
        let schema = self
            .builder
            .build_schema(schema_name, query_name, self.fetcher.clone())?;
        Ok(schema.sdl())
    }

    /// Execute a request, returning the response data as JSON
    ///
    /// Unknown schemas or tables fail before anything executes; otherwise the
    /// first execution error is returned as `TablegraphError::Query`.
    pub async fn execute(&self, request: QueryRequest) -> Result<serde_json::Value> {
        let schema = self.builder.build_schema(
            &request.schema_name,
            &request.query_name,
            self.fetcher.clone(),
        )?;

        let mut graphql_request = async_graphql::Request::new(request.q);
        if let Some(variables) = request.variables {
            graphql_request = graphql_request.variables(Variables::from_json(variables));
        }

        let response = schema.execute(graphql_request).await;
        if let Some(error) = response.errors.first() {
            tracing::debug!("Query failed with {} errors", response.errors.len());
            return Err(TablegraphError::Query(error.message.clone()));
        }

        Ok(response.data.into_json()?)
    }
}
