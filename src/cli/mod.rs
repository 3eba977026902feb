pub mod commands;
pub mod display;
pub mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::MoodboardClient;
use crate::app::App;
use crate::state::{Config, FileSessionStore};

pub type CliApp = App<MoodboardClient, FileSessionStore>;

#[derive(Parser, Debug)]
#[command(name = "moodboard", version, about = "Mood journal with music, in your terminal")]
pub struct Cli {
    /// Path to config.toml (defaults to <data_dir>/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config.toml to the data directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Log in with your e-mail and password
    Login {
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Analyse a journal entry
    Analyze {
        /// Entry text; read from stdin when omitted
        text: Option<String>,
        /// Dictate the entry instead of typing it
        #[arg(short, long, conflicts_with = "text")]
        dictate: bool,
        /// Skip the playlist
        #[arg(long)]
        no_music: bool,
        /// Start the player on the returned playlist
        #[arg(short, long, conflicts_with = "no_music")]
        play: bool,
    },
    /// List saved entries
    History,
    /// Delete a saved entry
    Delete { entry_id: i64 },
    /// Play the playlist of a saved entry
    Play { entry_id: i64 },
    /// One-sentence summary of your week
    Summary,
    /// Check that the API is reachable
    Health,
}

pub async fn run(command: Command, app: &mut CliApp, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Init { force } => commands::misc::init(config, force),
        Command::Login { email, password } => commands::auth::login(app, &email, password).await,
        Command::Register {
            username,
            email,
            full_name,
            password,
        } => commands::auth::register(app, username, email, full_name, password).await,
        Command::Logout => commands::auth::logout(app).await,
        Command::Whoami => commands::auth::whoami(app).await,
        Command::Analyze {
            text,
            dictate,
            no_music,
            play,
        } => {
            let include_music = config.include_music && !no_music;
            commands::analyze::run(app, config, text, dictate, include_music, play).await
        }
        Command::History => commands::history::list(app).await,
        Command::Delete { entry_id } => commands::history::delete(app, entry_id).await,
        Command::Play { entry_id } => commands::play::saved(app, config, entry_id).await,
        Command::Summary => commands::history::summary(app).await,
        Command::Health => commands::misc::health(app, config).await,
    }
}
