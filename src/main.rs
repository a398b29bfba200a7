use clap::{Parser, Subcommand};
use emoji_sync::config::Config;
use emoji_sync::error::Result;
use emoji_sync::logging::init_logging;
use emoji_sync::store::{HttpStore, RemoteStore};
use emoji_sync::sync::SyncManager;
use emoji_sync::AVAILABLE_EMOJIS;
use log::error;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "emoji-sync")]
#[command(about = "Diagnostic driver for the emoji-sharing sync core")]
#[command(version)]
struct Cli {
    /// Override the settings file location
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an emoji tap and sync it to the remote store
    Add {
        /// One of the available glyphs
        emoji: String,
    },

    /// Fetch and print all entries, newest first
    List,

    /// Delete one entry by id
    Delete { id: String },

    /// Delete every entry
    Clear,

    /// Show account status and sync state
    Status,

    /// Update sync settings
    Config {
        /// Set the device label stamped onto new entries
        #[arg(long)]
        device_label: Option<String>,

        /// Set the record server base URL
        #[arg(long)]
        base_url: Option<String>,
    },
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("emoji-sync")
            .join("settings.json")
    })
}

async fn manager_for(config: &Config) -> Result<SyncManager> {
    let store = Arc::new(HttpStore::new(
        config.base_url.clone(),
        config.container_id.clone(),
    )?);
    let manager = SyncManager::new(store, config.device_label.clone());
    manager.initialize().await?;
    Ok(manager)
}

async fn run(cli: Cli) -> Result<()> {
    let path = config_path(&cli);
    let config = Config::load(&path)?;

    match cli.command {
        Commands::Add { emoji } => {
            if !AVAILABLE_EMOJIS.contains(&emoji.as_str()) {
                return Err(emoji_sync::StoreError::InvalidConfiguration(format!(
                    "'{emoji}' is not in the available set: {}",
                    AVAILABLE_EMOJIS.join(" ")
                )));
            }
            let manager = manager_for(&config).await?;
            let entry = manager.add(&emoji).await?;
            println!("Added {} ({})", entry.emoji, entry.id);
        }
        Commands::List => {
            let manager = manager_for(&config).await?;
            for entry in manager.entries() {
                println!(
                    "{}  {}  {}  {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.emoji,
                    entry.device,
                    entry.id
                );
            }
        }
        Commands::Delete { id } => {
            let manager = manager_for(&config).await?;
            manager.delete(&id).await?;
            println!("Deleted {id}");
        }
        Commands::Clear => {
            let manager = manager_for(&config).await?;
            manager.clear_all().await;
            println!("Cleared; {} entries remain", manager.entries().len());
        }
        Commands::Status => {
            let store = HttpStore::new(config.base_url.clone(), config.container_id.clone())?;
            match store.account_status().await {
                Ok(status) => println!("Account: {status}"),
                Err(e) => println!("Account: check failed ({e})"),
            }
            let manager = manager_for(&config).await?;
            let state = manager.state();
            println!("Entries: {}", state.entries.len());
            println!(
                "Last error: {}",
                state.last_error.as_deref().unwrap_or("none")
            );
            for line in manager.trace().snapshot() {
                println!("  {line}");
            }
        }
        Commands::Config {
            device_label,
            base_url,
        } => {
            let mut config = config;
            if let Some(label) = device_label {
                config.device_label = label;
            }
            if let Some(url) = base_url {
                config.base_url = url;
            }
            config.save(&path)?;
            println!("Settings saved to {}", path.display());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if e.is_transient() {
            error!("{e} (transient; try again once connectivity returns)");
        } else {
            error!("{e}");
        }
        std::process::exit(1);
    }
}
