mod types;

pub use types::{
    ColumnConfig, Config, OwningUserConfig, ScalarPolicy, SchemaConfig, SchemaOptions,
    TableConfig,
};

use crate::error::{Result, TablegraphError};
use std::fs;

/// Load configuration from a TOML file
pub fn load_config(path: &str) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .map_err(|e| TablegraphError::Config(format!("Failed to read config file '{}': {}", path, e)))?;

    let config: Config = toml::from_str(&contents)?;
    validate(&config)?;

    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &str) -> Result<()> {
    validate(config)?;

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string)
        .map_err(|e| TablegraphError::Config(format!("Failed to write config file '{}': {}", path, e)))?;

    Ok(())
}

/// Validate every schema and table
pub fn validate(config: &Config) -> Result<()> {
    for (i, schema) in config.catalog.iter().enumerate() {
        if config.catalog[..i].iter().any(|s| s.name == schema.name) {
            return Err(TablegraphError::Config(format!(
                "Schema '{}' is declared twice",
                schema.name
            )));
        }

        for (j, table) in schema.table.iter().enumerate() {
            table.validate().map_err(|e| {
                TablegraphError::Config(format!("Invalid table '{}.{}': {}", schema.name, table.name, e))
            })?;

            if schema.table[..j].iter().any(|t| t.name == table.name) {
                return Err(TablegraphError::Config(format!(
                    "Table '{}.{}' is declared twice",
                    schema.name, table.name
                )));
            }
        }
    }

    if config.owning_user.type_name.trim().is_empty() {
        return Err(TablegraphError::Config(
            "owning_user.type_name must not be empty".to_string(),
        ));
    }

    Ok(())
}
