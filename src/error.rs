use thiserror::Error;

#[derive(Error, Debug)]
pub enum TablegraphError {
    #[error("schema: {0}")]
    SchemaNotFound(String),

    #[error("query: {table} (schema '{schema}')")]
    TableNotFound { schema: String, table: String },

    #[error("Schema build error: {0}")]
    SchemaBuild(String),

    #[error("Unsupported type '{native}' on column '{table}.{column}'")]
    UnsupportedScalar {
        table: String,
        column: String,
        native: String,
    },

    #[error("{0}")]
    Query(String),

    #[error("Row source error: {0}")]
    Source(String),

    #[error("Delta table error: {0}")]
    DeltaTable(#[from] deltalake::DeltaTableError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TablegraphError {
    /// True for the errors a caller sees as "no such schema or table".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TablegraphError::SchemaNotFound(_) | TablegraphError::TableNotFound { .. }
        )
    }
}

impl From<toml::de::Error> for TablegraphError {
    fn from(err: toml::de::Error) -> Self {
        TablegraphError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for TablegraphError {
    fn from(err: toml::ser::Error) -> Self {
        TablegraphError::Serialization(format!("TOML serialization error: {}", err))
    }
}

impl From<serde_json::Error> for TablegraphError {
    fn from(err: serde_json::Error) -> Self {
        TablegraphError::Serialization(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, TablegraphError>;
