/// GraphQL schema builder
///
/// `SchemaBuilder` compiles one table's metadata into a complete dynamic
/// schema: the root table's object type, the types of every table reachable
/// through foreign keys, the `Query` root, and the support types.

use crate::catalog::{MetadataProvider, TableDescriptor};
use crate::config::{Config, OwningUserConfig, SchemaOptions};
use crate::error::{Result, TablegraphError};
use crate::schema::fetch::Fetcher;
use crate::schema::links::{has_links_interface, link_object};
use crate::schema::object::{ObjectTypeBuilder, ObjectTypeDef};
use crate::schema::registry::TypeRegistry;
use crate::schema::root::build_root;
use crate::schema::scalars::long_scalar;
use crate::schema::QUERY;

use async_graphql::dynamic::{Object, Schema};
use std::sync::Arc;

/// Schema builder for generating GraphQL schemas from table metadata
#[derive(Clone)]
pub struct SchemaBuilder {
    metadata: Arc<dyn MetadataProvider>,
    options: SchemaOptions,
    owning_user: OwningUserConfig,
}

impl SchemaBuilder {
    /// Create a schema builder with default options
    pub fn new(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            metadata,
            options: SchemaOptions::default(),
            owning_user: OwningUserConfig::default(),
        }
    }

    /// Create a schema builder using the `[schema]` and `[owning_user]` settings
    pub fn from_config(metadata: Arc<dyn MetadataProvider>, config: &Config) -> Self {
        Self::new(metadata)
            .options(config.schema.clone())
            .owning_user(config.owning_user.clone())
    }

    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = options;
        self
    }

    pub fn owning_user(mut self, owning_user: OwningUserConfig) -> Self {
        self.owning_user = owning_user;
        self
    }

    /// Compile the types for `schema.table` without assembling a schema
    ///
    /// Fails with `SchemaNotFound`/`TableNotFound` when the root table does not
    /// exist; foreign keys to missing tables degrade instead.
    pub fn compile(&self, schema: &str, table: &str) -> Result<CompiledSchema> {
        let root = self.metadata.table(schema, table)?;
        tracing::info!("Building schema for {}", root.table_ref());

        let mut registry = TypeRegistry::new();
        let builder = ObjectTypeBuilder::new(self.metadata.as_ref(), &self.options, &self.owning_user);
        let root_type = builder.ensure_table_type(&mut registry, &root)?;
        let types = registry.into_types()?;

        let root_def = types
            .iter()
            .find(|def| def.name == root_type)
            .ok_or_else(|| {
                TablegraphError::SchemaBuild(format!("Root type '{}' was not built", root_type))
            })?;
        let query = build_root(&root, root_def)?;

        tracing::info!(
            "Compiled {} object types for {} (root type '{}')",
            types.len(),
            root.table_ref(),
            root_type
        );

        Ok(CompiledSchema {
            table: root,
            root_type,
            types,
            query,
            options: self.options.clone(),
        })
    }

    /// Build the executable schema for `schema.table`
    pub fn build_schema(&self, schema: &str, table: &str, fetcher: Fetcher) -> Result<Schema> {
        self.compile(schema, table)?.into_schema(fetcher)
    }
}

/// Object types and `Query` root compiled for one table
pub struct CompiledSchema {
    table: Arc<TableDescriptor>,
    root_type: String,
    types: Vec<ObjectTypeDef>,
    query: Object,
    options: SchemaOptions,
}

impl CompiledSchema {
    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    /// Name of the root table's object type
    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    /// Every table object type, root first
    pub fn types(&self) -> &[ObjectTypeDef] {
        &self.types
    }

    pub fn get(&self, name: &str) -> Option<&ObjectTypeDef> {
        self.types.iter().find(|def| def.name == name)
    }

    /// Assemble the executable schema; `fetcher` becomes schema data for the resolvers
    pub fn into_schema(self, fetcher: Fetcher) -> Result<Schema> {
        let mut schema_builder = Schema::build(QUERY, None, None)
            .register(long_scalar())
            .register(link_object())
            .register(has_links_interface());

        for def in self.types {
            schema_builder = schema_builder.register(def.into_object());
        }

        schema_builder = schema_builder.register(self.query).data(fetcher);

        if let Some(depth) = self.options.max_depth {
            schema_builder = schema_builder.limit_depth(depth);
        }
        if let Some(complexity) = self.options.max_complexity {
            schema_builder = schema_builder.limit_complexity(complexity);
        }

        schema_builder.finish().map_err(|e| {
            TablegraphError::SchemaBuild(format!("Failed to build schema: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ColumnDescriptor, NativeType};
    use crate::source::MemoryRowSource;

    fn builder() -> SchemaBuilder {
        let catalog = Catalog::new().with_table(
            TableDescriptor::new("lists", "Item")
                .description("Things on a list")
                .column(ColumnDescriptor::new("id", NativeType::Integer).required())
                .column(ColumnDescriptor::new("total", NativeType::BigInt))
                .primary_key(["id"]),
        );
        SchemaBuilder::new(Arc::new(catalog))
    }

    #[test]
    fn test_compile_root_type() {
        let compiled = builder().compile("lists", "Item").unwrap();
        assert_eq!(compiled.root_type(), "lists__Item");
        assert_eq!(compiled.types().len(), 1);
        assert_eq!(compiled.table().name, "Item");
        assert!(compiled.get("lists__Item").is_some());
    }

    #[test]
    fn test_compile_unknown_table() {
        assert!(matches!(
            builder().compile("lists", "Nope"),
            Err(TablegraphError::TableNotFound { .. })
        ));
        assert!(matches!(
            builder().compile("nope", "Item"),
            Err(TablegraphError::SchemaNotFound(_))
        ));
    }

    #[test]
    fn test_sdl_contains_support_types() {
        let schema = builder()
            .build_schema("lists", "Item", Fetcher::new(Arc::new(MemoryRowSource::new())))
            .unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("scalar Long"));
        assert!(sdl.contains("interface HasLinks"));
        assert!(sdl.contains("type lists__Item implements HasLinks"));
        assert!(sdl.contains("Item(id: Int!): lists__Item"));
        assert!(sdl.contains("total: Long"));
        assert!(sdl.contains("links: [Link!]"));
    }
}
