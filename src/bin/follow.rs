use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use versefeed::{
    ActionKind, Config, HttpApi, InteractionTarget, Session, TargetKind, ToggleController,
};

#[derive(Parser, Debug)]
struct Args {
    /// Username of the creator to follow, or unfollow if you already follow them.
    #[arg(long)]
    username: String,

    /// The creator's current follower count.
    #[arg(long, default_value_t = 0)]
    followers: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load_env_config().context("Failed to load config")?;
    let session = Arc::new(Session::from_config(&config));
    if !session.is_authenticated() {
        bail!("Sign in first: set VERSEFEED_TOKEN in your environment or .env file");
    }

    let controller = ToggleController::new(HttpApi::new(&config)?, session.clone());

    println!("Fetching who you follow...");
    controller
        .hydrate_following()
        .await
        .context("Failed to fetch who you follow")?;

    let mut creator = InteractionTarget::new(TargetKind::Creator, args.username.clone())
        .with_owner(args.username.clone());
    creator.counts.followers = args.followers;
    session.following().seed([&mut creator]);

    let outcome = controller
        .toggle(&mut creator, ActionKind::Follow)
        .await
        .with_context(|| format!("Failed to update follow of {}", args.username))?;

    if outcome.flag {
        println!("Following {} ({} followers)", args.username, outcome.count);
    } else {
        println!("Unfollowed {} ({} followers)", args.username, outcome.count);
    }
    Ok(())
}
