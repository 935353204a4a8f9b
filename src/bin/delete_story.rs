use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use versefeed::{Config, HttpApi, Session, Story, ToggleController};

#[derive(Parser, Debug)]
struct Args {
    /// Slug of the story to delete.
    #[arg(long)]
    slug: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load_env_config().context("Failed to load config")?;
    let controller = ToggleController::new(
        HttpApi::new(&config)?,
        Arc::new(Session::from_config(&config)),
    );

    println!("Deleting {}...", args.slug);

    let mut loaded: Vec<Arc<Story>> = Vec::new();
    controller
        .delete_story(&args.slug, &mut [&mut loaded])
        .await
        .with_context(|| format!("Failed to delete {}", args.slug))?;

    println!("Successfully deleted");
    Ok(())
}
