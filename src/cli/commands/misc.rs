use anyhow::{bail, Context, Result};

use crate::api::MoodService;
use crate::cli::CliApp;
use crate::state::Config;

pub async fn health(app: &mut CliApp, config: &Config) -> Result<()> {
    let status = app
        .service()
        .health()
        .await
        .with_context(|| format!("API at {} is unreachable", config.api_base_url))?;

    println!(
        "{}: {}",
        status.service.as_deref().unwrap_or("moodboard api"),
        status.status
    );
    println!("API: {}", config.api_base_url);
    match app.session() {
        Some(session) => println!("Session: {}", session.user.username),
        None => println!("Session: not logged in"),
    }
    Ok(())
}

pub fn init(config: &Config, force: bool) -> Result<()> {
    let path = config.config_path();
    if path.exists() && !force {
        bail!("{:?} already exists (use --force to overwrite)", path);
    }
    config.save(&path)?;
    println!("Wrote {:?}", path);
    Ok(())
}
