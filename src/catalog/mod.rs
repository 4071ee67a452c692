//! Table metadata: descriptors, the metadata provider seam, and the
//! configuration-backed catalog.

mod template;
mod types;

pub use template::UrlTemplate;
pub use types::{
    type_name_for, ColumnDescriptor, DisabledFlag, ForeignKey, Junction, LinkTemplate,
    LookupTarget, NativeType, TableDescriptor, TableRef,
};

use crate::config::Config;
use crate::error::{Result, TablegraphError};

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of table metadata
pub trait MetadataProvider: Send + Sync {
    /// Resolve a table by schema and table name
    ///
    /// Fails with `SchemaNotFound` or `TableNotFound`.
    fn table(&self, schema: &str, table: &str) -> Result<Arc<TableDescriptor>>;

    /// Resolve the target table of a lookup
    fn lookup_table(&self, target: &LookupTarget) -> Result<Arc<TableDescriptor>> {
        self.table(&target.schema, &target.table)
    }
}

/// In-memory catalog of schemas and tables
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    schemas: IndexMap<String, IndexMap<String, Arc<TableDescriptor>>>,
    locations: IndexMap<TableRef, PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from configuration
    ///
    /// Relative `data` paths are resolved against `base_dir`.
    pub fn from_config(config: &Config, base_dir: Option<&Path>) -> Result<Self> {
        crate::config::validate(config)?;

        let mut catalog = Catalog::new();
        for schema in &config.catalog {
            // An empty schema still exists
            catalog.schemas.entry(schema.name.clone()).or_default();

            for table in &schema.table {
                let descriptor = table.to_descriptor(&schema.name);
                if let Some(data) = &table.data {
                    let path = Path::new(data);
                    let path = match base_dir {
                        Some(base) if path.is_relative() => base.join(path),
                        _ => path.to_path_buf(),
                    };
                    catalog.locations.insert(descriptor.table_ref(), path);
                }
                catalog.insert(descriptor);
            }
        }

        tracing::debug!(
            "Loaded catalog with {} schemas and {} tables",
            catalog.schemas.len(),
            catalog.tables().count()
        );

        Ok(catalog)
    }

    /// Add or replace a table
    pub fn insert(&mut self, table: TableDescriptor) -> Arc<TableDescriptor> {
        let table = Arc::new(table);
        self.schemas
            .entry(table.schema.clone())
            .or_default()
            .insert(table.name.clone(), Arc::clone(&table));
        table
    }

    pub fn with_table(mut self, table: TableDescriptor) -> Self {
        self.insert(table);
        self
    }

    /// All tables, in declaration order
    pub fn tables(&self) -> impl Iterator<Item = &Arc<TableDescriptor>> {
        self.schemas.values().flat_map(|tables| tables.values())
    }

    /// Where a table's rows are stored, when configured
    pub fn data_location(&self, table: &TableRef) -> Option<&Path> {
        self.locations.get(table).map(PathBuf::as_path)
    }

    /// Tables with a configured data location
    pub fn data_locations(&self) -> impl Iterator<Item = (&TableRef, &Path)> {
        self.locations.iter().map(|(table, path)| (table, path.as_path()))
    }
}

/// Exact key first, then a case-insensitive match
fn find_ignore_case<'a, V>(map: &'a IndexMap<String, V>, key: &str) -> Option<&'a V> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

impl MetadataProvider for Catalog {
    fn table(&self, schema: &str, table: &str) -> Result<Arc<TableDescriptor>> {
        let tables = find_ignore_case(&self.schemas, schema)
            .ok_or_else(|| TablegraphError::SchemaNotFound(schema.to_string()))?;

        find_ignore_case(tables, table)
            .cloned()
            .ok_or_else(|| TablegraphError::TableNotFound {
                schema: schema.to_string(),
                table: table.to_string(),
            })
    }
}
