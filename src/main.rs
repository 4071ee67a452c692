use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "tablegraph")]
#[command(version = "0.1.0")]
#[command(about = "Query relational tables through GraphQL schemas built from their metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example configuration and CSV data
    Init {
        /// Output directory
        #[arg(long, default_value = ".")]
        output: String,
    },

    /// Execute a GraphQL document against one table's schema
    Query {
        /// Config file path
        #[arg(long, default_value = "tablegraph.toml")]
        config: String,

        /// Schema holding the table
        #[arg(long)]
        schema: String,

        /// Table to query
        #[arg(long)]
        table: String,

        /// GraphQL document
        #[arg(long)]
        query: String,

        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,
    },

    /// Print the generated schema in SDL
    Sdl {
        /// Config file path
        #[arg(long, default_value = "tablegraph.toml")]
        config: String,

        /// Schema holding the table
        #[arg(long)]
        schema: String,

        /// Table whose schema to print
        #[arg(long)]
        table: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            cli::init::run(output)?;
        }
        Commands::Query {
            config,
            schema,
            table,
            query,
            variables,
        } => {
            cli::query::run(config, schema, table, query, variables).await?;
        }
        Commands::Sdl {
            config,
            schema,
            table,
        } => {
            cli::sdl::run(config, schema, table).await?;
        }
    }

    Ok(())
}
