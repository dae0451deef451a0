//! GeoVisits CLI - database migrations and interactive visit entry.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! geovisits-cli migrate
//!
//! # Create a visit, prompting for each field
//! geovisits-cli visit create
//!
//! # Pre-fill some answers; anything invalid is asked again
//! geovisits-cli visit create --name "Ana Lopez" --latitude 40.4168
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;

use geovisits_server::{
    config::AppConfig,
    models::visit::VisitPayload,
    repository::Repository,
    services::Services,
    validation::validate_field,
};

#[derive(Parser)]
#[command(name = "geovisits-cli")]
#[command(author, version, about = "GeoVisits CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage visits
    Visit {
        #[command(subcommand)]
        action: VisitAction,
    },
}

#[derive(Subcommand)]
enum VisitAction {
    /// Create a new visit record
    Create {
        /// Customer name
        #[arg(long)]
        name: Option<String>,

        /// Customer email
        #[arg(long)]
        email: Option<String>,

        /// Latitude, -90 to 90
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<String>,

        /// Longitude, -180 to 180
        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geovisits_server=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            println!("Migrations applied.");
        }
        Commands::Visit { action } => match action {
            VisitAction::Create {
                name,
                email,
                latitude,
                longitude,
            } => {
                let stdin = io::stdin();
                let mut input = stdin.lock();

                let payload = VisitPayload {
                    name: Some(ask(&mut input, "name", "What is the customer name?", name)?),
                    email: Some(ask(&mut input, "email", "What is the customer email?", email)?),
                    latitude: Some(ask(&mut input, "latitude", "What is the latitude?", latitude)?),
                    longitude: Some(ask(&mut input, "longitude", "What is the longitude?", longitude)?),
                };

                let services = Services::new(Repository::new(pool), config.auth.clone());
                let visit = services
                    .visits
                    .create(&payload)
                    .await
                    .context("Error creating visit")?;

                println!("Visit created successfully!");
                println!("ID: {}", visit.id);
                println!("Name: {}", visit.name);
                println!("Email: {}", visit.email);
                println!("Location: {}, {}", visit.latitude, visit.longitude);
            }
        },
    }

    Ok(())
}

/// Read one field, asking again until it passes validation.
///
/// A pre-filled answer is tried first and only replaced if it is invalid.
fn ask(input: &mut impl BufRead, field: &str, label: &str, preset: Option<String>) -> anyhow::Result<Value> {
    let mut preset = preset;
    loop {
        let raw = match preset.take() {
            Some(value) => value,
            None => {
                print!("{} ", label);
                io::stdout().flush()?;
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    bail!("input closed before {} was entered", field);
                }
                line
            }
        };

        let value = Value::String(raw.trim().to_string());
        match validate_field(field, value.clone()) {
            Ok(()) => return Ok(value),
            Err(reasons) => {
                for reason in reasons {
                    eprintln!("  {}", reason);
                }
            }
        }
    }
}
