mod cli;

use anyhow::{bail, Result};
use clap::Parser;

use cli::{Cli, Commands};
use vodhub::playlist;
use vodhub::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "vodhub=debug" } else { "vodhub=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // offline; no config or database needed
    if let Commands::Resolve { play_list, episode } = &cli.command {
        print_resolved(play_list, *episode);
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.database.is_some() {
        config.database_url = cli.database.clone();
    }
    let hub = Vodhub::connect(config, true).await?;
    run(&hub, cli.command).await
}

async fn run(hub: &Vodhub, command: Commands) -> Result<()> {
    match command {
        Commands::Resolve { play_list, episode } => print_resolved(&play_list, episode),
        Commands::Sources { start } => {
            if hub.sources().is_empty() {
                println!("No sources configured.");
                return Ok(());
            }
            let window = hub.source_window(start);
            for s in window.visible(hub.sources().as_slice()) {
                println!("{:<12} {:<16} {}", s.key, s.name, s.url);
            }
            println!(
                "[{}-{} of {}]{}{}",
                window.start() + 1,
                (window.start() + window.width()).min(window.total()),
                window.total(),
                if window.can_go_prev() { format!("  prev: --start {}", window.prev_start()) } else { String::new() },
                if window.can_go_next() { format!("  next: --start {}", window.next_start()) } else { String::new() },
            );
        }
        Commands::Play { id, episode, source, list } => {
            let mut route = PlayRoute::parse(&id).unwrap_or(PlayRoute { video_id: id, episode: None, source: None });
            route.episode = episode.or(route.episode);
            route.source = source.or(route.source);

            let session = hub.open_play(&route).await;
            report_load(&session, session.load().await)?;
            print_session(&session, list);
        }
        Commands::Switch { id, to, episode, from } => {
            let route = PlayRoute { video_id: id, episode, source: from };
            let session = hub.open_play(&route).await;
            report_load(&session, session.load().await)?;
            match session.switch_source(&to).await {
                Ok(SwitchOutcome::Switched(route)) => println!("Switched: {route}"),
                Ok(SwitchOutcome::Stale) => println!("Switch superseded."),
                Err(e) if e.is_retryable() => {
                    println!("Could not switch to {to}: {e}. Still on {}; try again later.", session.state().selected_source);
                }
                Err(e) => bail!(e),
            }
            print_session(&session, false);
        }
        Commands::Search { term, page, refresh } => {
            let route = SearchRoute::new(term, page);
            let results = hub.search(&route, refresh).await;
            if results.is_empty() {
                println!("Nothing found for \"{}\".", results.term);
                return Ok(());
            }
            for c in &results.cards {
                println!(
                    "{:<10} {}  [{}] {}",
                    c.id,
                    c.title,
                    c.rating.as_deref().unwrap_or("-"),
                    c.episode_count.map(|n| format!("{n} eps")).unwrap_or_default(),
                );
            }
            let pages = results.pagination();
            if pages.is_visible() {
                let strip: Vec<String> = pages
                    .page_numbers()
                    .into_iter()
                    .map(|n| if n == pages.page { format!("[{n}]") } else { n.to_string() })
                    .collect();
                println!("page {} of {}: {}", pages.page, pages.total_pages, strip.join(" "));
                if pages.can_go_next() {
                    println!("next: {}", route.with_page(pages.page + 1));
                }
            }
        }
        Commands::History { limit, forget } => {
            if let Some(id) = forget {
                println!("Removed {} entr(ies).", hub.forget(&id).await?);
                return Ok(());
            }
            for e in hub.history(limit).await? {
                println!("{:<10} {:<30} ep {:<4} {:<10} {}", e.video_id, e.title, e.episode, e.source_key, e.last_watched);
            }
        }
        Commands::CacheClear { prefix, expired } => {
            let n = if expired { hub.purge_expired_cache().await? } else { hub.clear_cache_prefix(prefix.as_deref()).await? };
            println!("Cleared {n} cache entr(ies).");
        }
        Commands::Vacuum => {
            hub.vacuum_db().await?;
            println!("Done.");
        }
    }
    Ok(())
}

fn print_resolved(play_list: &str, episode: u32) {
    match playlist::resolve(play_list, episode) {
        Some(ep) => println!("{}\t{}", ep.label, ep.url),
        None => println!("No episode {} (play list has {})", episode, playlist::episode_count(play_list)),
    }
}

fn report_load(session: &PlaySession, outcome: LoadOutcome) -> Result<()> {
    match outcome {
        LoadOutcome::Loaded | LoadOutcome::Stale => Ok(()),
        LoadOutcome::NotFound => bail!("video {} not found on {}", session.state().video_id, session.state().selected_source),
        LoadOutcome::Unavailable => match session.state().status {
            LoadStatus::Unavailable(reason) => bail!("catalog unavailable: {reason}"),
            _ => bail!("catalog unavailable"),
        },
    }
}

fn print_session(session: &PlaySession, list: bool) {
    let st = session.state();
    if let Some(v) = &st.video {
        println!("{} ({} {} {})", v.name, v.type_name, v.year, v.area);
        println!("{} episodes on {}", v.episode_count(), st.selected_source);
    }
    match session.current_stream() {
        Some(ep) => println!("Episode {}: {}\t{}", ep.number, ep.label, ep.url),
        None => println!("Episode {}: nothing to play", st.episode),
    }
    println!("{}", session.route());
    if list {
        for ep in session.episodes() {
            println!("{:>4}  {}", ep.number, ep.label);
        }
    }
}
