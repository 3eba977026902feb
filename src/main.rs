use anyhow::Result;
use clap::Parser;

use moodboard::api::MoodboardClient;
use moodboard::app::App;
use moodboard::cli::{self, Cli};
use moodboard::logging::init_logging;
use moodboard::state::{Config, FileSessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref())?;
    let _guard = init_logging(&config.logs_dir(), cli.verbose)?;
    tracing::debug!(api = %config.api_base_url, data_dir = ?config.data_dir, "Config resolved");

    let mut app = App::new(
        MoodboardClient::new(&config.api_base_url),
        FileSessionStore::new(config.session_path()),
        config.allowed_email_domain.clone(),
    );

    if let Err(e) = cli::run(cli.command, &mut app, &config).await {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        return Err(e);
    }
    Ok(())
}
