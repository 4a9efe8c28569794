use std::{path::PathBuf, process::ExitCode};

use chrono::Utc;
use clap::{Parser, Subcommand};
use flight_profile::{
    errors::AppError,
    models::profile::ProfileSubmission,
    store::{ProfileStore, StoreError, postgres::PgProfileStore},
    utils::jwt::{DEFAULT_SESSION_HOURS, generate_token},
    validation::{Violation, validate_profile},
};
use sqlx::postgres::PgPoolOptions;

#[derive(Parser)]
#[command(name = "profile_admin")]
#[command(about = "Operator tooling for flight profile documents", long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a profile JSON file and store it as a new document
    Create { path: PathBuf },
    /// Print a stored profile and its version
    Show { username: String },
    /// Remove a stored profile
    Delete { username: String },
    /// Mint a session token for a user
    Token {
        username: String,
        /// Lifetime of the token in hours
        #[arg(default_value_t = DEFAULT_SESSION_HOURS)]
        hours: i64,
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum AdminError {
    #[error("DATABASE_URL env var not set")]
    MissingDatabaseUrl,
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile rejected: {0}")]
    Invalid(#[from] Violation),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("failed to issue token: {0:?}")]
    Token(AppError),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AdminError> {
    match cli.command {
        Command::Create { path } => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| AdminError::Read { path, source })?;
            let submission: ProfileSubmission = serde_json::from_str(&raw)?;
            let profile = validate_profile(&submission, Utc::now())?.into_profile();

            let store = connect(cli.database_url).await?;
            store.ensure_collection().await?;
            let stored = store.create(&profile).await?;
            println!(
                "Created profile [{}] at version {}",
                stored.profile.username, stored.version
            );
        }
        Command::Show { username } => {
            let store = connect(cli.database_url).await?;
            match store.get(&username).await? {
                Some(stored) => {
                    println!("{}", serde_json::to_string_pretty(&stored.profile)?);
                    println!("(version {})", stored.version);
                }
                None => println!("No profile for [{username}]"),
            }
        }
        Command::Delete { username } => {
            let store = connect(cli.database_url).await?;
            store.delete(&username).await?;
            println!("Deleted profile [{username}]");
        }
        Command::Token {
            username,
            hours,
            secret,
        } => {
            let token = generate_token(&username, &secret, hours).map_err(AdminError::Token)?;
            println!("{token}");
        }
    }

    Ok(())
}

async fn connect(database_url: Option<String>) -> Result<PgProfileStore, AdminError> {
    let url = database_url.ok_or(AdminError::MissingDatabaseUrl)?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .map_err(AdminError::Connect)?;

    Ok(PgProfileStore::new(pool))
}
