pub mod catalog;
pub mod config;
pub mod error;
pub mod schema;
pub mod service;
pub mod source;

// Re-export commonly used types
pub use catalog::{Catalog, MetadataProvider, TableDescriptor, TableRef};
pub use config::Config;
pub use error::{Result, TablegraphError};
pub use schema::{Fetcher, SchemaBuilder};
pub use service::{QueryRequest, QueryService};
pub use source::{MemoryRowSource, Row, RowSource, SessionSource};
