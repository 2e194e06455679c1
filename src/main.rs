use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use vidgo::Config;
use vidgo::events::{EventBus, EventPayload, EventType};
use vidgo::models::{SourceId, VideoSource};
use vidgo::player::{HeadlessRenderer, PlayerController, PlayerHandle, PlayerSnapshot};
use vidgo::utils::{PlayerError, format_seconds};

/// Length every source pretends to have in the headless renderer
const HEADLESS_DURATION: Duration = Duration::from_secs(10 * 60);
const ENGINE_TICK: Duration = Duration::from_millis(250);

const HELP: &str = "\
commands:
  list                     show the playlist
  add <url> [title]        append a source
  remove <id>              remove a source
  select <id>              make a source active
  play | pause | toggle    playback
  seek <percent>           jump to a position
  fwd | back               skip by the configured step
  skip <seconds>           skip by any amount (negative goes back)
  vol <percent>            set system volume
  mute                     toggle system mute
  status [json]            show player state
  quit";

#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    List,
    Add { url: String, title: Option<String> },
    Remove(String),
    Select(String),
    Play,
    Pause,
    Toggle,
    Seek(f64),
    Forward,
    Back,
    Skip(f64),
    Volume(f64),
    Mute,
    Status { json: bool },
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    let number = |what: &str| -> Result<f64, String> {
        rest.first()
            .ok_or_else(|| format!("{verb} needs {what}"))?
            .parse::<f64>()
            .map_err(|e| format!("bad {what}: {e}"))
    };
    let word = |what: &str| -> Result<String, String> {
        rest.first()
            .map(|s| s.to_string())
            .ok_or_else(|| format!("{verb} needs {what}"))
    };

    let command = match verb {
        "list" | "ls" => ReplCommand::List,
        "add" => ReplCommand::Add {
            url: word("a url")?,
            title: (rest.len() > 1).then(|| rest[1..].join(" ")),
        },
        "remove" | "rm" => ReplCommand::Remove(word("an id")?),
        "select" => ReplCommand::Select(word("an id")?),
        "play" => ReplCommand::Play,
        "pause" => ReplCommand::Pause,
        "toggle" | "p" => ReplCommand::Toggle,
        "seek" => ReplCommand::Seek(number("a percentage")? / 100.0),
        "fwd" => ReplCommand::Forward,
        "back" => ReplCommand::Back,
        "skip" => ReplCommand::Skip(number("seconds")?),
        "vol" => ReplCommand::Volume(number("a percentage")? / 100.0),
        "mute" => ReplCommand::Mute,
        "status" => ReplCommand::Status {
            json: rest.first() == Some(&"json"),
        },
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(command)
}

fn print_playlist(snapshot: &PlayerSnapshot) {
    if snapshot.sources.is_empty() {
        println!("(playlist is empty)");
        return;
    }
    for source in &snapshot.sources {
        let marker = if snapshot.active_id.as_ref() == Some(&source.id) {
            '*'
        } else {
            ' '
        };
        let volume = source
            .default_volume
            .map(|v| format!("{:.0}%", v * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:>14}  {:<8} {:>5}  {}",
            marker, source.id, source.kind, volume, source.title
        );
    }
}

fn print_status(snapshot: &PlayerSnapshot) {
    let playback = &snapshot.playback;
    let title = snapshot
        .active()
        .map(|s| s.title.as_str())
        .unwrap_or("(nothing loaded)");

    println!("{}", title);
    println!(
        "  {:?}{}  {} / {}  buffered {:.0}%",
        playback.phase,
        if playback.seeking { " (seeking)" } else { "" },
        format_seconds(playback.position_seconds()),
        format_seconds(playback.duration_seconds),
        playback.buffered_fraction * 100.0
    );
    println!(
        "  volume {:.0}%{}  controls {}",
        snapshot.volume.display_volume() * 100.0,
        if snapshot.volume.muted { " (muted)" } else { "" },
        if snapshot.controls_visible {
            "visible"
        } else {
            "hidden"
        }
    );
}

/// Returns `false` when the user asked to quit.
async fn execute(handle: &PlayerHandle, command: ReplCommand) -> Result<bool> {
    // Typing at the player counts as activity over it
    handle.user_activity()?;

    match command {
        ReplCommand::List => print_playlist(&handle.snapshot().await?),
        ReplCommand::Add { url, title } => {
            let title = title.unwrap_or_else(|| url.clone());
            let source = VideoSource::from_url(title, url);
            let id = source.id.clone();
            match handle.add_source(source).await {
                Ok(()) => println!("added {}", id),
                Err(e @ PlayerError::DuplicateSource(_)) => println!("{}", e),
                Err(e) => return Err(e.into()),
            }
        }
        ReplCommand::Remove(id) => handle.remove_source(SourceId::from(id))?,
        ReplCommand::Select(id) => match handle.select_source(SourceId::from(id)).await {
            Err(e @ PlayerError::SourceNotFound(_)) => println!("{}", e),
            other => other?,
        },
        ReplCommand::Play => handle.play()?,
        ReplCommand::Pause => handle.pause()?,
        ReplCommand::Toggle => handle.toggle_play_pause()?,
        ReplCommand::Seek(fraction) => handle.scrub_to(fraction)?,
        ReplCommand::Forward => handle.skip_forward()?,
        ReplCommand::Back => handle.skip_backward()?,
        ReplCommand::Skip(seconds) => handle.skip_by(seconds)?,
        ReplCommand::Volume(volume) => handle.set_volume(volume)?,
        ReplCommand::Mute => handle.toggle_mute()?,
        ReplCommand::Status { json } => {
            let snapshot = handle.snapshot().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_status(&snapshot);
            }
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vidgo=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting VidGo");

    let config = Config::load().context("Failed to load configuration")?;
    let event_bus = Arc::new(EventBus::new(256));
    let renderer = Arc::new(HeadlessRenderer::new(HEADLESS_DURATION));
    let audio = config.audio.create_control();

    let (handle, controller) =
        PlayerController::new(&config.playback, renderer.clone(), audio, event_bus);
    tokio::spawn(controller.run());

    {
        let handle = handle.clone();
        tokio::spawn(async move { renderer.drive(handle, ENGINE_TICK).await });
    }

    // Surface what a GUI would render differently
    let mut events = handle
        .event_bus()
        .subscribe_to_types(vec![EventType::Controls, EventType::Volume]);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event.payload {
                EventPayload::Controls(change) => debug!("Controls: {:?}", change),
                EventPayload::Volume(change) => debug!("Volume: {:?}", change),
                _ => {}
            }
        }
    });

    for source in config.playlist.to_sources() {
        if let Err(e) = handle.add_source(source).await {
            warn!("Skipping configured source: {}", e);
        }
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                if !execute(&handle, command).await? {
                    break;
                }
            }
            Err(message) => println!("{}", message),
        }
    }

    info!("Shutting down");
    Ok(())
}
