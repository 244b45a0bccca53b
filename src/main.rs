use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tunestream::auth;
use tunestream::config::Config;
use tunestream::logging;
use tunestream::model::{
    format_time, AppModel, GenreFilter, HttpCatalogGateway, SortKey, ToggleOutcome,
    TrackId, KNOWN_GENRES,
};
use tunestream::{AppController, Player};

#[derive(Parser)]
#[command(name = "tunestream", version, about = "Browse and play the tunestream catalog")]
struct Cli {
    /// Config file (defaults to ./tunestream.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token; falls back to --token-file, then $TUNESTREAM_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog
    Songs {
        #[arg(short, long, default_value = "")]
        search: String,
        /// Genre, or "all"
        #[arg(short, long, default_value = "all")]
        genre: String,
        /// title, artist or year
        #[arg(long, default_value = "title")]
        sort: SortKey,
    },
    /// Add or remove a favorite
    Favorite { track_id: String },
    /// Play a track with the simulated clock
    Play {
        track_id: String,
        /// Stop after this many seconds (default: until the track ends)
        #[arg(long)]
        seconds: Option<u32>,
        #[arg(long)]
        seek: Option<i64>,
        #[arg(long)]
        volume: Option<i32>,
        #[arg(long)]
        shuffle: bool,
        /// Number of repeat-mode steps (off → all → one)
        #[arg(long, default_value_t = 0)]
        repeat_steps: u8,
    },
    /// Show listening stats
    Stats,
    /// Show the account profile
    Profile,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url.clone() {
        config.api_base_url = url;
    }

    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!(api = %config.api_base_url, "=== tunestream starting ===");

    let token_file = cli.token_file.clone().or_else(|| config.token_file.clone());
    let auth = auth::resolve_auth(cli.token.clone(), token_file.as_deref())?;

    let gateway = HttpCatalogGateway::new(&config.api_base_url, config.request_timeout())?;
    let player = Player::new(config.default_volume, config.tick_interval());
    let controller = AppController::new(Arc::new(AppModel::new()), Arc::new(gateway), auth, player);

    let result = run(&controller, cli.command).await;
    controller.dismiss_catalog().await;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }
    tracing::info!("tunestream shutting down");
    result
}

async fn run(controller: &AppController, command: Command) -> Result<()> {
    match command {
        Command::Songs { search, genre, sort } => {
            if !KNOWN_GENRES.contains(&genre.as_str()) {
                tracing::debug!(%genre, "Filtering by a genre outside the known list");
            }
            mount(controller).await?;
            let model = controller.model();
            model.update_search_query(search).await;
            model.set_genre(GenreFilter::from(genre.as_str())).await;
            model.set_sort_key(sort).await;

            let rows = controller.model().visible_rows().await;
            if rows.is_empty() {
                println!("No songs match.");
            }
            for row in rows {
                let badge = if row.favorite { "♥" } else { " " };
                let year = match row.track.release_year {
                    0 => String::new(),
                    year => year.to_string(),
                };
                println!(
                    "{} {:<24} {:<32} {:<20} {:<10} {:>4} {:>6}",
                    badge,
                    row.track.id,
                    row.track.title,
                    row.track.artist,
                    row.track.genre,
                    year,
                    row.track.duration
                );
            }
        }
        Command::Favorite { track_id } => {
            mount(controller).await?;
            let outcome = controller
                .toggle_favorite(&TrackId::new(track_id.clone()))
                .await?;
            match outcome {
                ToggleOutcome::Added => println!("Added {track_id} to favorites"),
                ToggleOutcome::Removed => println!("Removed {track_id} from favorites"),
                ToggleOutcome::Discarded => println!("Favorite update for {track_id} was dropped"),
            }
        }
        Command::Play {
            track_id,
            seconds,
            seek,
            volume,
            shuffle,
            repeat_steps,
        } => {
            mount(controller).await?;
            play(controller, TrackId::new(track_id), seconds, seek, volume, shuffle, repeat_steps).await?;
        }
        Command::Stats => match controller.load_stats().await {
            Some(stats) => {
                println!("Songs played:   {}", stats.total_plays);
                println!("Favorites:      {}", stats.favorites_count);
                println!("Playlists:      {}", stats.total_playlists());
                println!("Songs listened: {}", stats.songs_listened);
                if !stats.top_genres.is_empty() {
                    println!("Top genres:     {}", serde_json::to_string(&stats.top_genres)?);
                }
            }
            None => {
                let notice = controller.model().get_ui_state().await.notice;
                println!("Stats unavailable: {}", notice.unwrap_or_default());
            }
        },
        Command::Profile => {
            let profile = controller.load_profile().await?;
            println!("{} <{}>", profile.username, profile.email);
            let joined = profile.join_date_label();
            if !joined.is_empty() {
                println!("Member since {joined}");
            }
            println!("{} favorites, {} listened", profile.favorites.len(), profile.listened.len());
        }
    }
    Ok(())
}

async fn mount(controller: &AppController) -> Result<()> {
    let summary = controller.mount_catalog().await?;
    if summary.favorites.is_none() {
        eprintln!("(favorites unavailable)");
    }
    Ok(())
}

async fn play(
    controller: &AppController,
    track_id: TrackId,
    seconds: Option<u32>,
    seek: Option<i64>,
    volume: Option<i32>,
    shuffle: bool,
    repeat_steps: u8,
) -> Result<()> {
    let player = controller.player();
    controller.select_track(&track_id).await?;

    if let Some(volume) = volume {
        player.set_volume(volume).await;
    }
    if shuffle {
        player.toggle_shuffle().await;
    }
    for _ in 0..repeat_steps {
        player.cycle_repeat().await;
    }
    if let Some(position) = seek {
        player.seek(position).await;
    }

    let info = player.info().await;
    if let Some(track) = &info.track {
        println!("Now playing: {} - {} ({})", track.title, track.artist, track.album);
    }
    println!(
        "vol {}% | shuffle {} | repeat {}",
        info.settings.volume,
        if info.settings.shuffle { "on" } else { "off" },
        info.settings.repeat
    );

    if !player.play().await {
        println!("Nothing left to play at {}", format_time(info.position_seconds));
        return Ok(());
    }

    let mut refresh = tokio::time::interval(player.tick_interval());
    let mut elapsed = 0u32;
    loop {
        refresh.tick().await;
        let info = player.info().await;
        println!("  {}", info.progress_label());
        if !info.is_playing() {
            break;
        }
        if seconds.is_some_and(|limit| elapsed >= limit) {
            player.pause().await;
            break;
        }
        elapsed += 1;
    }

    player.close().await;
    Ok(())
}
