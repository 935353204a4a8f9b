use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use versefeed::{paginate, Config, HttpApi, Session, ToggleController};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    query: String,

    /// 1-based page of each section to print.
    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long, default_value_t = 10)]
    per_page: usize,
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

    controller
        .hydrate_following()
        .await
        .context("Failed to fetch who you follow")?;
    let results = controller
        .search(&args.query)
        .await
        .with_context(|| format!("Search for {:?} failed", args.query))?;

    if results.is_empty() {
        println!("No results for {:?}", args.query);
        return Ok(());
    }

    let stories = paginate(&results.stories, args.page, args.per_page);
    println!("Stories (page {}/{}):", stories.page, stories.total_pages);
    for story in stories.items {
        println!(
            "  {} [{}] {} likes, {} saves",
            story.title,
            story.slug().unwrap_or("-"),
            story.target.counts.likes,
            story.target.counts.saves
        );
    }

    let verses = paginate(&results.verses, args.page, args.per_page);
    println!("Verses (page {}/{}):", verses.page, verses.total_pages);
    for verse in verses.items {
        println!(
            "  #{} of {}: {}",
            verse.position,
            verse.story_slug.as_deref().unwrap_or("-"),
            verse.content.as_deref().unwrap_or("")
        );
    }

    let creators = paginate(&results.creators, args.page, args.per_page);
    println!("Creators (page {}/{}):", creators.page, creators.total_pages);
    for creator in creators.items {
        println!(
            "  {}{} ({} followers)",
            creator.username(),
            if creator.target.flags.following {
                " [following]"
            } else {
                ""
            },
            creator.target.counts.followers
        );
    }
    Ok(())
}
