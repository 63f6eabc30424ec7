// ABOUTME: Entry point for carelog — a chat client for a multimodal health-logging service.
// ABOUTME: Parses CLI args, loads config and credentials, and launches the app.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use carelog::app::App;
use carelog::config::{Config, TOKEN_ENV};

/// Chat with your health-log companion from the terminal.
#[derive(Parser, Debug)]
#[command(name = "carelog", version)]
struct Cli {
    /// Base URL of the log service (overrides config).
    #[arg(long)]
    server: Option<String>,

    /// Auth token (overrides the CARELOG_TOKEN environment variable).
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load local .env if present, then the carelog secrets file.
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_path(Config::secrets_env_path());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("carelog=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let base_url = cli
        .server
        .unwrap_or_else(|| config.server.base_url.clone());
    let token = match cli.token.or_else(Config::auth_token) {
        Some(token) => token,
        None => anyhow::bail!("no auth token: pass --token or set {}", TOKEN_ENV),
    };

    App::new(config, base_url, token).run().await
}
