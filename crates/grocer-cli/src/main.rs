mod commands;

use clap::{Parser, Subcommand};
use grocer_pipeline::QueryService;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "grocer-cli")]
#[command(about = "Query and refresh scraped grocery listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show parsed products, optionally scoped to a site and location
    Products {
        /// Site to filter by (dmart, jiomart, naturesbasket, zepto, swiggy)
        #[arg(long)]
        site: Option<String>,
        /// Location substring to filter by; requires --site
        #[arg(long, requires = "site")]
        location: Option<String>,
    },
    /// Run the parser on one HTML file and print its artifact
    Parse {
        /// Path to an `.html` file
        file: String,
    },
    /// Scrape every storefront for a product near a location
    Scrape {
        #[arg(long)]
        product: String,
        #[arg(long)]
        location: String,
    },
    /// Check that the data directories and external scripts are in place
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = grocer_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the JSON payload; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let service = QueryService::from_app_config(&config).await?;

    match cli.command {
        Commands::Products { site, location } => {
            commands::run_products(&service, site.as_deref(), location.as_deref()).await
        }
        Commands::Parse { file } => commands::run_parse(&service, &file).await,
        Commands::Scrape { product, location } => {
            commands::run_scrape(&service, &product, &location).await
        }
        Commands::Health => commands::run_health(&service).await,
    }
}

#[cfg(test)]
mod tests;
