use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::demo::{demo_config, DEMO_DATA, DEMO_QUERY};

/// Write the example configuration and its CSV data into `output`
pub fn run(output: String) -> Result<()> {
    let config_path = write_demo(Path::new(&output))?;
    let config_path = config_path.to_string_lossy();

    tracing::info!("📝 Generated {}", config_path);
    tracing::info!("");
    tracing::info!("💡 Next steps:");
    tracing::info!(
        "   tablegraph sdl --config {} --schema lists --table Item",
        config_path
    );
    tracing::info!(
        "   tablegraph query --config {} --schema lists --table Item --query '{}'",
        config_path,
        DEMO_QUERY
    );

    Ok(())
}

/// Write the demo CSVs and `tablegraph.toml`, returning the config path
pub fn write_demo(output_dir: &Path) -> Result<PathBuf> {
    tracing::info!("🎨 Setting up example catalog in {}", output_dir.display());

    for (relative, contents) in DEMO_DATA {
        let path = output_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("   • {}", path.display());
    }

    let config = demo_config()?;
    let config_path = output_dir.join("tablegraph.toml");
    tablegraph::config::save_config(&config, &config_path.to_string_lossy())?;

    Ok(config_path)
}
