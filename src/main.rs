use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use fxrates::config::{DEFAULT_BIND_ADDRESS, DatabaseConfig, ProviderConfig};
use fxrates::provider::RateProvider;
use fxrates::{RateStore, api, ingest};

#[derive(Parser)]
#[command(version, about = "Historical currency exchange rates")]
struct Cli {
    /// Database URL, overrides DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve GET /rates/{date}/
    Serve {
        #[arg(long, env = "BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
        bind: String,
    },
    /// Fetch rates for the 10 days before today and store the missing ones
    IngestRates,
    /// Apply pending database migrations and exit. Every command already
    /// migrates on startup, this one only stops there.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = default_log_filter(&cli.command);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut db = DatabaseConfig::from_env()?;
    if let Some(url) = cli.database_url {
        db.url = url;
    }
    let store = RateStore::connect(&db.url, db.max_connections)
        .await
        .with_context(|| format!("Can't open database {}", db.url))?;

    match cli.command {
        Commands::Serve { bind } => serve(store, &bind).await,
        Commands::IngestRates => ingest_rates(store).await,
        Commands::Migrate => {
            log::info!("Database {} is up to date", db.url);
            Ok(())
        }
    }
}

/// Access lines for `serve`; batch commands log only failed days.
fn default_log_filter(command: &Commands) -> &'static str {
    match command {
        Commands::Serve { .. } => "info",
        Commands::IngestRates | Commands::Migrate => "warn",
    }
}

async fn serve(store: RateStore, bind: &str) -> Result<()> {
    let store = web::Data::new(store);
    log::info!("Listening on {}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind(bind)
    .with_context(|| format!("Can't bind to {}", bind))?
    .run()
    .await?;

    Ok(())
}

async fn ingest_rates(store: RateStore) -> Result<()> {
    let config = ProviderConfig::from_env()?;
    let provider = RateProvider::new(&config)?;
    let today = Utc::now().date_naive();

    ingest::ingest_rates(&store, &provider, today).await?;

    Ok(())
}
