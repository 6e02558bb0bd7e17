// src/main.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use serde_json::Value;

use daruleman_site::catalog::{self, CatalogQuery, SortOrder};
use daruleman_site::config::Config;
use daruleman_site::repository::{row_id, Repositories};
use daruleman_site::resources::{
    AudioBayanat, Books, HamdoNaat, IslahiMajalis, Poems, Quotes, Resource,
};
use daruleman_site::web;

#[derive(Parser)]
#[command(name = "daruleman-site")]
#[command(about = "Content API and audio proxy for the Dar ul Eman site")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print a collection, filtered and sorted like the site's list pages
    List {
        #[arg(value_enum)]
        resource: ResourceKind,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Validate and append one record
    Add {
        #[arg(value_enum)]
        resource: ResourceKind,
        /// Record as inline JSON
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        json: Option<String>,
        /// Read the record from a JSON file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceKind {
    #[value(name = "audiobayanat")]
    AudioBayanat,
    #[value(name = "hamdonaatokalaam")]
    HamdoNaat,
    #[value(name = "poems")]
    Poems,
    #[value(name = "quotes")]
    Quotes,
    #[value(name = "books")]
    Books,
    #[value(name = "islahimajalis")]
    IslahiMajalis,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    env_logger::Builder::new()
        .filter_level(config.logging.level.parse().unwrap_or(LevelFilter::Info))
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            info!("Starting server in {} mode", config.server.environment);
            web::start_server(config).await?;
        }
        Commands::List {
            resource,
            lang,
            search,
            sort,
        } => {
            let repositories = Repositories::from_config(&config).await?;
            let query = CatalogQuery { lang, search, sort };
            match resource {
                ResourceKind::AudioBayanat => list::<AudioBayanat>(&repositories, &query).await?,
                ResourceKind::HamdoNaat => list::<HamdoNaat>(&repositories, &query).await?,
                ResourceKind::Poems => list::<Poems>(&repositories, &query).await?,
                ResourceKind::Quotes => list::<Quotes>(&repositories, &query).await?,
                ResourceKind::Books => list::<Books>(&repositories, &query).await?,
                ResourceKind::IslahiMajalis => list::<IslahiMajalis>(&repositories, &query).await?,
            }
        }
        Commands::Add {
            resource,
            json,
            file,
        } => {
            let raw = match (json, file) {
                (Some(json), _) => json,
                (None, Some(file)) => tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?,
                (None, None) => anyhow::bail!("Either --json or --file is required"),
            };
            let body: Value = serde_json::from_str(&raw).context("Record is not valid JSON")?;

            let repositories = Repositories::from_config(&config).await?;
            match resource {
                ResourceKind::AudioBayanat => add::<AudioBayanat>(&repositories, &body).await?,
                ResourceKind::HamdoNaat => add::<HamdoNaat>(&repositories, &body).await?,
                ResourceKind::Poems => add::<Poems>(&repositories, &body).await?,
                ResourceKind::Quotes => add::<Quotes>(&repositories, &body).await?,
                ResourceKind::Books => add::<Books>(&repositories, &body).await?,
                ResourceKind::IslahiMajalis => add::<IslahiMajalis>(&repositories, &body).await?,
            }
        }
        Commands::Config => {
            print!("{}", config.redacted().to_toml()?);
        }
    }

    Ok(())
}

async fn list<R: Resource>(repositories: &Repositories, query: &CatalogQuery) -> Result<()> {
    let rows = R::store(repositories)
        .list_all()
        .await
        .with_context(|| format!("Failed to load {}", R::LABEL))?;

    let rows = catalog::arrange::<R::Record>(rows, query);
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn add<R: Resource>(repositories: &Repositories, body: &Value) -> Result<()> {
    let record = R::prepare(body, Utc::now().date_naive())?;
    let created = R::store(repositories)
        .append(record)
        .await
        .with_context(|| format!("Failed to add {}", R::LABEL))?;

    info!("Added {} #{:?}", R::LABEL, row_id(&created));
    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}
