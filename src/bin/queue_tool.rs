use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use keepsake_sync::{
    config::KeepsakeConfig, kv::FileKvStore, media_store::MediaStore, model::QueueItem,
    queue::QueueStore,
};
use tracing::warn;

/// Inspect and manage the on-device offline memories queue.
#[derive(Parser, Debug)]
#[command(name = "queue_tool")]
#[command(about = "Inspect and manage the Keepsake offline memories queue")]
struct Args {
    /// Path to keepsake configuration file
    #[arg(short = 'c', long, default_value = "keepsake.toml")]
    config: PathBuf,

    /// List pending queue items
    #[arg(long)]
    list: bool,

    /// Print the number of pending queue items
    #[arg(long)]
    count: bool,

    /// Discard every pending item and wipe the staged media directory
    #[arg(long)]
    clear: bool,

    /// Print the effective configuration in TOML format and exit
    #[arg(long)]
    print_config: bool,

    /// Emit machine-readable JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = load_config(&args.config)?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    if !args.list && !args.count && !args.clear {
        return Err(anyhow!(
            "Nothing to do: pass --list, --count, --clear, or --print-config"
        ));
    }

    let kv = Arc::new(FileKvStore::new(&config.storage.queue_dir));
    let queue = QueueStore::new(kv, config.storage.queue_key.clone());

    if args.count {
        println!("{}", queue.count().await);
    }

    if args.list {
        let items = queue.list().await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else {
            print_table(&items);
        }
    }

    if args.clear {
        queue
            .clear()
            .await
            .context("Failed to clear queue snapshot")?;
        MediaStore::new(&config.storage.media_dir)
            .clear_all()
            .await
            .context("Failed to clear staged media")?;
        println!("Cleared queue and staged media");
    }

    Ok(())
}

fn load_config(path: &PathBuf) -> Result<KeepsakeConfig> {
    if path.exists() {
        let config = KeepsakeConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    } else {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        Ok(KeepsakeConfig::default())
    }
}

fn print_table(items: &[QueueItem]) {
    if items.is_empty() {
        println!("Queue is empty");
        return;
    }

    println!(
        "{:<16} {:<12} {:<6} {:<20} caption",
        "id", "child", "media", "enqueued"
    );
    for item in items {
        println!(
            "{:<16} {:<12} {:<6} {:<20} {}",
            item.id,
            item.child_id,
            item.media.len(),
            item.enqueued_at.format("%Y-%m-%d %H:%M:%S"),
            truncate(&item.caption, 40)
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let shortened: String = text.chars().take(max_chars).collect();
        format!("{}...", shortened)
    }
}
