use crate::app::{Glide, GlideArgs};
use crate::console::ConsoleCommand;
use crate::errors::Result;
use clap::Parser;
use glide_core::core::media::discover_videos;
use glide_logging::GlideLogger;
use log::{debug, error, info, LevelFilter};
use std::io;
use std::str::FromStr;
use std::time::Instant;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::select;

mod app;
mod console;
mod errors;

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = GlideArgs::parse();

    start(args)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

/// Start the glide application with the given arguments.
/// This future keeps running until the user quits or mpv has been closed.
async fn start(args: GlideArgs) -> Result<()> {
    let _logger = if args.disable_logger {
        None
    } else {
        Some(
            GlideLogger::builder()
                .root_level(args.log_level)
                .output(args.log_output())
                .logger("fx_callback", LevelFilter::Info)
                .logger("mio", LevelFilter::Info)
                .logger("walkdir", LevelFilter::Info)
                .build()?,
        )
    };
    let properties = args.properties()?;

    if args.list {
        let root = GlideArgs::library_root(&properties)?;
        for video in discover_videos(&root, properties.library.extensions.as_slice()) {
            println!("{}", video.display());
        }
        return Ok(());
    }

    let start = Instant::now();
    let glide = Glide::new(&properties, args.wid).await?;
    let time_taken = start.elapsed();
    info!(
        "Created new glide instance in {}.{:03} seconds",
        time_taken.as_secs(),
        time_taken.subsec_millis()
    );

    if let Some(file) = &args.file {
        if let Err(e) = glide.issuer().play(file.as_str()).await {
            error!("Failed to play {}, {}", file, e);
        }
    }

    run_console(&glide).await;
    glide.shutdown().await;
    Ok(())
}

/// Process the console commands until the user quits, ctrl-c is received or mpv has been closed.
async fn run_console(glide: &Glide) {
    let mut lines = BufReader::new(stdin()).lines();
    let mut console_open = true;
    println!("{}", ConsoleCommand::USAGE);

    loop {
        select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = glide.closed() => {
                info!("Mpv connection has been closed");
                break;
            },
            line = lines.next_line(), if console_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {},
                Ok(Some(line)) => match ConsoleCommand::from_str(line.as_str()) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(glide, &command).await {
                            error!("Failed to execute {}, {}", command, e);
                        }
                    },
                    Err(e) => println!("{}", e),
                },
                Ok(None) => {
                    debug!("Console input has been closed");
                    console_open = false;
                },
                Err(e) => {
                    error!("Failed to read console input, {}", e);
                    console_open = false;
                }
            },
        }
    }
}

/// Execute the given console command on the glide instance.
async fn execute(glide: &Glide, command: &ConsoleCommand) -> Result<()> {
    let issuer = glide.issuer();
    match command {
        ConsoleCommand::Play(path) => issuer.play(path.as_str()).await?,
        ConsoleCommand::Pause => issuer.pause().await?,
        ConsoleCommand::Resume => issuer.resume().await?,
        ConsoleCommand::Seek(time) => issuer.seek(*time).await?,
        ConsoleCommand::Volume(volume) => issuer.set_volume(*volume).await?,
        ConsoleCommand::Fullscreen => issuer.toggle_fullscreen().await?,
        ConsoleCommand::Stop => {
            let result = issuer.stop().await;
            glide.store().reset().await;
            result?
        }
        ConsoleCommand::State => {
            let state = glide.store().get().await;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        ConsoleCommand::Help => println!("{}", ConsoleCommand::USAGE),
        ConsoleCommand::Quit => {}
    }

    Ok(())
}
