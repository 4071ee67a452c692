use anyhow::{Context, Result};
use std::path::Path;
use tablegraph::{QueryRequest, QueryService};

/// Load the configuration and the query engine for `config_path`
pub async fn load_service(config_path: &str) -> Result<QueryService> {
    tracing::info!("📖 Loading configuration from {}", config_path);
    let config = tablegraph::config::load_config(config_path)?;

    let base_dir = Path::new(config_path).parent();
    QueryService::from_config(&config, base_dir)
        .await
        .with_context(|| format!("Failed to load the catalog from {}", config_path))
}

/// Run one document and print the JSON result
pub async fn run(
    config_path: String,
    schema: String,
    table: String,
    query: String,
    variables: Option<String>,
) -> Result<()> {
    let service = load_service(&config_path).await?;

    let mut request = QueryRequest::new(schema, table, query);
    if let Some(variables) = variables {
        let variables: serde_json::Value =
            serde_json::from_str(&variables).context("Variables must be a JSON object")?;
        request = request.variables(variables);
    }

    let data = service.execute(request).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::demo::DEMO_QUERY;
    use crate::cli::init::write_demo;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_demo_query() {
        let _ = tracing_subscriber::fmt::try_init();

        let dir = TempDir::new().unwrap();
        let config_path = write_demo(dir.path()).unwrap();
        let service = load_service(&config_path.to_string_lossy()).await.unwrap();

        let data = service
            .execute(QueryRequest::new("lists", "Item", DEMO_QUERY))
            .await
            .unwrap();

        assert_eq!(data["Item"]["name"], "widget");
        assert_eq!(data["Item"]["ownerId"]["name"], "bob");

        let mut tags: Vec<_> = data["Item"]["tags"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|tag| tag["name"].as_str())
            .collect();
        tags.sort();
        assert_eq!(tags, vec!["green", "red"]);
    }

    #[tokio::test]
    async fn test_demo_sdl() {
        let dir = TempDir::new().unwrap();
        let config_path = write_demo(dir.path()).unwrap();
        let service = load_service(&config_path.to_string_lossy()).await.unwrap();

        let sdl = service.sdl("lists", "Item").unwrap();
        assert!(sdl.contains("tags: [lists__Tag]"));
        assert!(sdl.contains("CreatedBy: core__Users"));
    }
}
