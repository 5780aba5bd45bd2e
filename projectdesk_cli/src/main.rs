mod commands;
mod output;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use projectdesk_lib::projectdesk_api::Client;
use projectdesk_lib::{ClientConfig, FileCredentialStore, Resource};

use crate::output::OutputFormat;
use crate::session::TerminalNavigator;

#[derive(Parser)]
#[command(name = "projectdesk")]
#[command(about = "Browse projects, proposals and documents on a ProjectDesk backend")]
struct Cli {
    /// Output format: table, json or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Credentials file (default: ~/.projectdesk/credentials.json)
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login(commands::auth::LoginArgs),
    /// Forget the stored session
    Logout,
    /// List a resource page by page
    List(commands::list::ListArgs),
    /// Check whether a period window is open
    Period(commands::period::PeriodArgs),
    /// Upload a document
    Upload(commands::documents::UploadArgs),
    /// Download a document
    Download(commands::documents::DownloadArgs),
}

impl Commands {
    /// The screen this command stands in for, as the client sees it.
    fn path(&self, config: &ClientConfig) -> String {
        match self {
            Commands::Login(_) => config.login_path.clone(),
            Commands::List(args) => args
                .resource
                .parse::<Resource>()
                .map(|r| r.path().to_string())
                .unwrap_or_else(|_| "/".to_string()),
            Commands::Upload(_) | Commands::Download(_) => Resource::Documents.path().to_string(),
            Commands::Logout | Commands::Period(_) => "/".to_string(),
        }
    }
}

fn credentials_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let home = std::env::var_os("HOME").context("HOME is not set; pass --credentials")?;
    Ok(PathBuf::from(home)
        .join(".projectdesk")
        .join("credentials.json"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("projectdesk=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let config = ClientConfig::from_env();
    let store = Arc::new(FileCredentialStore::open(credentials_path(cli.credentials)?)?);
    let navigator = Arc::new(TerminalNavigator::new(&cli.command.path(&config)));
    let client = Arc::new(Client::new(config, store, navigator)?);

    match &cli.command {
        Commands::Login(args) => commands::auth::login(args, &client, &format).await?,
        Commands::Logout => commands::auth::logout(&client),
        Commands::List(args) => commands::list::run(args, client.clone(), &format).await?,
        Commands::Period(args) => commands::period::run(args, client.clone(), &format).await?,
        Commands::Upload(args) => commands::documents::upload(args, &client, &format).await?,
        Commands::Download(args) => commands::documents::download(args, &client).await?,
    }

    Ok(())
}
