/// GraphQL schema generation from table metadata
///
/// This module compiles a table's columns and foreign keys into an
/// async-graphql dynamic schema with lazy, row-source-backed resolvers.

mod builder;
mod fetch;
mod links;
mod object;
mod registry;
mod resolver;
mod root;
mod scalars;
mod type_mapping;

pub use builder::{CompiledSchema, SchemaBuilder};
pub use fetch::Fetcher;
pub use links::{Link, LinkAffordances, HAS_LINKS, LINK};
pub use object::{FieldDef, ObjectTypeBuilder, ObjectTypeDef};
pub use registry::{Ensured, TypeRegistry, TypeState};
pub use resolver::{resolve, FieldResolution, Resolved};
pub use root::build_root;
pub use scalars::LONG;
pub use type_mapping::{column_scalar, column_type, scalar_for};

/// Name of the root query type
pub const QUERY: &str = "Query";
