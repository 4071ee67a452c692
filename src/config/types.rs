use crate::catalog::{ColumnDescriptor, ForeignKey, LinkTemplate, NativeType, TableDescriptor};

use serde::{Deserialize, Serialize};

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schema: SchemaOptions,

    #[serde(default)]
    pub owning_user: OwningUserConfig,

    /// Schemas and their tables
    #[serde(default)]
    pub catalog: Vec<SchemaConfig>,
}

/// What to do with native types that have no natural GraphQL scalar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarPolicy {
    /// Expose the column as `String`
    #[default]
    Fallback,
    /// Fail the schema build
    Strict,
}

/// Schema generation options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaOptions {
    #[serde(default)]
    pub unsupported_scalars: ScalarPolicy,

    /// Maximum query depth; lookups can nest without bound otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_complexity: Option<usize>,
}

/// The well-known users table every owning-user column resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwningUserConfig {
    #[serde(default = "default_user_schema")]
    pub schema: String,

    #[serde(default = "default_user_table")]
    pub table: String,

    /// Name of the shared GraphQL type
    #[serde(default = "default_user_type_name")]
    pub type_name: String,
}

impl Default for OwningUserConfig {
    fn default() -> Self {
        Self {
            schema: default_user_schema(),
            table: default_user_table(),
            type_name: default_user_type_name(),
        }
    }
}

fn default_user_schema() -> String {
    "core".to_string()
}

fn default_user_table() -> String {
    "Users".to_string()
}

fn default_user_type_name() -> String {
    "core__Users".to_string()
}

/// A schema and its tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub name: String,

    #[serde(default)]
    pub table: Vec<TableConfig>,
}

/// Table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub primary_key: Vec<String>,

    /// Details link template, or `false` to disable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_url: Option<LinkTemplate>,

    /// Update link template, or `false` to disable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_url: Option<LinkTemplate>,

    /// CSV file, Parquet file or Delta table directory holding the rows
    /// (relative paths are resolved against the config file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    pub column: Vec<ColumnConfig>,
}

/// Column configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub native_type: NativeType,

    #[serde(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<ForeignKey>,
}

impl TableConfig {
    /// Validate table configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Table name must not be empty".to_string());
        }

        if self.column.is_empty() {
            return Err(format!("Table '{}' has no columns", self.name));
        }

        for (i, column) in self.column.iter().enumerate() {
            if self.column[..i].iter().any(|c| c.name == column.name) {
                return Err(format!(
                    "Column '{}' is declared twice in table '{}'",
                    column.name, self.name
                ));
            }
        }

        for pk in &self.primary_key {
            if !self.column.iter().any(|c| c.name.eq_ignore_ascii_case(pk)) {
                return Err(format!(
                    "Primary key column '{}' is not a column of table '{}'",
                    pk, self.name
                ));
            }
        }

        Ok(())
    }

    /// Convert into a descriptor owned by `schema`
    pub fn to_descriptor(&self, schema: &str) -> TableDescriptor {
        TableDescriptor {
            schema: schema.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            columns: self
                .column
                .iter()
                .map(|c| ColumnDescriptor {
                    name: c.name.clone(),
                    description: c.description.clone(),
                    native_type: c.native_type.clone(),
                    required: c.required,
                    foreign_key: c.lookup.clone(),
                })
                .collect(),
            primary_key: self.primary_key.clone(),
            details_url: self.details_url.clone(),
            update_url: self.update_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableConfig {
        TableConfig {
            name: "Item".to_string(),
            description: None,
            primary_key: vec!["id".to_string()],
            details_url: None,
            update_url: None,
            data: None,
            column: vec![
                ColumnConfig {
                    name: "id".to_string(),
                    native_type: NativeType::Integer,
                    required: true,
                    description: None,
                    lookup: None,
                },
                ColumnConfig {
                    name: "name".to_string(),
                    native_type: NativeType::VarChar,
                    required: false,
                    description: Some("Display name".to_string()),
                    lookup: None,
                },
            ],
        }
    }

    #[test]
    fn test_table_validation_valid() {
        assert!(table().validate().is_ok());
    }

    #[test]
    fn test_table_validation_unknown_primary_key() {
        let mut table = table();
        table.primary_key = vec!["rowid".to_string()];
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_table_validation_duplicate_column() {
        let mut table = table();
        let duplicate = table.column[1].clone();
        table.column.push(duplicate);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_table_validation_no_columns() {
        let mut table = table();
        table.column.clear();
        table.primary_key.clear();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_to_descriptor() {
        let descriptor = table().to_descriptor("lists");
        assert_eq!(descriptor.schema, "lists");
        assert_eq!(descriptor.columns.len(), 2);
        assert!(descriptor.columns[0].required);
        assert_eq!(descriptor.columns[1].description.as_deref(), Some("Display name"));
    }

    #[test]
    fn test_owning_user_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.owning_user.type_name, "core__Users");
        assert_eq!(config.schema.unsupported_scalars, ScalarPolicy::Fallback);
        assert!(config.catalog.is_empty());
    }
}
