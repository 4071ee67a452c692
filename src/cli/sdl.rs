use anyhow::Result;

/// Print the generated SDL for one table
pub async fn run(config_path: String, schema: String, table: String) -> Result<()> {
    let service = crate::cli::query::load_service(&config_path).await?;
    println!("{}", service.sdl(&schema, &table)?);
    Ok(())
}
