use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use versefeed::{
    ActionError, ActionKind, Config, HttpApi, InteractionTarget, Session, TargetKind,
    ToggleController,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    Like,
    Save,
}

#[derive(Parser, Debug)]
struct Args {
    /// Slug of the story to act on.
    #[arg(long, conflicts_with = "verse", required_unless_present = "verse")]
    story: Option<String>,

    /// Slug of the verse to act on.
    #[arg(long)]
    verse: Option<String>,

    #[arg(long, value_enum)]
    action: Action,

    /// Whether the item is currently liked/saved by you.
    #[arg(long)]
    active: bool,

    /// The item's current like/save count.
    #[arg(long, default_value_t = 0)]
    count: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load_env_config().context("Failed to load config")?;

    let (kind, slug) = match (args.story, args.verse) {
        (Some(slug), _) => (TargetKind::Story, slug),
        (None, Some(slug)) => (TargetKind::Verse, slug),
        (None, None) => bail!("Pass --story or --verse"),
    };
    let action = match args.action {
        Action::Like => ActionKind::Like,
        Action::Save => ActionKind::Save,
    };

    let mut target = InteractionTarget::new(kind, slug);
    target.set(action, args.active, args.count);

    let session = Arc::new(Session::from_config(&config));
    let controller = ToggleController::new(HttpApi::new(&config)?, session);

    match controller.toggle(&mut target, action).await {
        Ok(outcome) => {
            println!("{action}: {} ({})", outcome.flag, outcome.count);
            Ok(())
        }
        Err(ActionError::Unauthenticated) => {
            bail!("Sign in first: set VERSEFEED_TOKEN in your environment or .env file")
        }
        Err(error) => Err(error).context(format!("Failed to {action}")),
    }
}
