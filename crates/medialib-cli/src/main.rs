mod cli;
mod logging;
mod notify;
mod render;

use std::process::ExitCode;

use clap::Parser;

use medialib_core::config::{AppConfig, PlaybackMode};
use medialib_core::error::CoreError;
use medialib_core::view;
use medialib_runtime::{Runtime, RuntimeError};

use crate::cli::{Cli, Command, ConfigCommand, CoverCommand};
use crate::notify::ConsoleNotifier;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] CoreError),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("medialib: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;

    if let Command::Config(cmd) = &cli.command {
        return show_config(cmd, &config);
    }

    let _guard = logging::init(&config.logging).map_err(CliError::Logging)?;
    tracing::debug!(?config, "Configuration loaded");

    let mut runtime = medialib_runtime::start(&config, ConsoleNotifier)?;
    execute(cli.command, &mut runtime).await;
    Ok(())
}

/// Config file, then command-line overrides.
fn load_config(cli: &Cli) -> Result<AppConfig, CoreError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    if cli.embedded {
        config.playback.mode = PlaybackMode::Embedded;
    }
    if let Some(player) = &cli.player {
        config.player.preferred = Some(player.clone());
    }
    Ok(config)
}

fn show_config(cmd: &ConfigCommand, config: &AppConfig) -> Result<(), CliError> {
    match cmd {
        ConfigCommand::Path => println!("{}", AppConfig::config_path().display()),
        ConfigCommand::Show => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}

async fn execute(command: Command, runtime: &mut Runtime<ConsoleNotifier>) {
    match command {
        Command::Library => {
            if runtime.refresh_library().await {
                print!("{}", render::library(&runtime.store().snapshot()));
            }
        }
        Command::Continue => {
            if runtime.refresh_library().await {
                let catalog = runtime.store().snapshot();
                let shelf = render::shelf(&view::continue_watching(&catalog));
                if shelf.is_empty() {
                    println!("Nothing in progress");
                } else {
                    print!("{shelf}");
                }
            }
        }
        Command::Series { name } => {
            if runtime.refresh_library().await {
                let catalog = runtime.store().snapshot();
                let mut listing = view::series_listing(&catalog);
                if let Some(name) = &name {
                    listing.retain(|s| s.name.eq_ignore_ascii_case(name));
                }
                print!("{}", render::series(&listing, name.is_some()));
            }
        }
        Command::Movies => {
            if runtime.refresh_library().await {
                print!("{}", render::movies(view::movie_grid(&runtime.store().snapshot())));
            }
        }
        Command::Play { path, detach } => {
            runtime.refresh_library().await;
            if runtime.play(&path).await && !detach {
                follow(runtime).await;
            }
        }
        Command::Next { path, detach } => {
            runtime.refresh_library().await;
            match runtime.play_next_episode(&path).await {
                Some(_) if !detach => follow(runtime).await,
                Some(_) => {}
                None => println!("No next episode"),
            }
        }
        Command::Toggle { path } => {
            runtime.refresh_library().await;
            runtime.toggle_watched(&path).await;
            print_item(runtime, &path);
        }
        Command::MarkWatched { path } => {
            runtime.refresh_library().await;
            runtime.select_target(path.as_str());
            if runtime.mark_watched().await {
                print_item(runtime, &path);
            }
        }
        Command::Reset { path } => {
            runtime.refresh_library().await;
            runtime.select_target(path.as_str());
            if runtime.reset_progress().await {
                print_item(runtime, &path);
            }
        }
        Command::Cover(CoverCommand::Get { title, kind }) => {
            match runtime.cover(&title, kind.into()).await {
                Ok(Some(url)) => println!("{url}"),
                Ok(None) => println!("No cover set for {title}"),
                Err(e) => {
                    tracing::error!(title = %title, error = %e, "Error fetching cover");
                    eprintln!("error: {}", e.user_message());
                }
            }
        }
        Command::Cover(CoverCommand::Set { title, url, kind }) => {
            match runtime.set_cover(&title, kind.into(), &url).await {
                Ok(()) => println!("Cover saved for {title}"),
                Err(e) => {
                    tracing::error!(title = %title, error = %e, "Error saving cover");
                    eprintln!("error: {}", e.user_message());
                }
            }
        }
        Command::Config(_) => {}
    }
}

/// Track external playback until it ends or the user interrupts.
async fn follow(runtime: &mut Runtime<ConsoleNotifier>) {
    if runtime.player_mode().is_embedded() {
        return;
    }
    println!(
        "Tracking playback every {}s (Ctrl+C to stop)",
        runtime.settings().poll_interval.as_secs()
    );
    tokio::select! {
        _ = runtime.follow_playback() => println!("Playback finished"),
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, progress tracking stopped"),
    }
}

fn print_item(runtime: &Runtime<ConsoleNotifier>, path: &str) {
    if let Some(item) = runtime.store().find_by_path(path) {
        println!("{}", render::card(&item.name, &item));
    }
}
