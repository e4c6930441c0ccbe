mod commands;
mod render;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use commands::{Command, HELP};
use moodcast::consts::CHANNEL_CAPACITY;
use moodcast::discover::{fetch_row, DISCOVER_ROWS};
use moodcast::types::{Filters, Modality, SessionState};
use moodcast::utils::{CaptureDevice, CaptureSource, FrameDirectory};
use moodcast::{Config, ConfigBuilder, HttpRecommendationApi, MoodFusionController, RecommendationApi, WsConnector};
use moodcast_utils::device::get_available_inputs;
use moodcast_utils::microphone::Microphone;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
#[command(version, about = "Mood-based movie and game recommendations")]
struct Cli {
    /// Directory of still images replayed as the camera feed
    #[arg(long)]
    frames_dir: Option<PathBuf>,
    /// Audio input device for the voice signal (default device if omitted)
    #[arg(long)]
    input_device: Option<String>,
    /// Overrides MOODCAST_BASE_URL
    #[arg(long)]
    base_url: Option<String>,
}

/// Stand-in for a capture device that could not be set up.
struct Unavailable(String);

impl<P> CaptureDevice<P> for Unavailable {
    fn open(&mut self) -> Result<Box<dyn CaptureSource<P>>> {
        Err(anyhow!("{}", self.0))
    }
}

fn face_device(frames_dir: Option<PathBuf>) -> Box<dyn CaptureDevice<moodcast::utils::EncodedFrame>> {
    match frames_dir {
        Some(dir) => Box::new(FrameDirectory::new(dir)),
        None => Box::new(Unavailable("no camera feed, start with --frames-dir".to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(base_url) = &cli.base_url {
        config = ConfigBuilder::from_config(config).with_base_url(base_url).build();
    }

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_timer(ChronoLocal::rfc_3339())
        .init();
    tracing::info!("Using analysis service at {}", config.base_url());

    let mut connector = WsConnector::new(CHANNEL_CAPACITY);
    if let Some((name, value)) = config.tunnel_header() {
        connector = connector.with_header(name, value);
    }
    let api = HttpRecommendationApi::new(&config).context("Failed to build HTTP client")?;

    // The stream must stay on this thread; only its tap goes to the controller.
    let microphone = match Microphone::open(cli.input_device.clone()) {
        Ok(mic) => {
            tracing::info!("Voice signal will use {}", mic.name());
            Some(mic)
        }
        Err(e) => {
            tracing::warn!("No microphone available: {:#}", e);
            None
        }
    };
    let voice_device: Box<dyn CaptureDevice<moodcast::utils::AudioChunk>> = match &microphone {
        Some(mic) => Box::new(mic.tap()),
        None => Box::new(Unavailable("no microphone available".to_string())),
    };

    let mut controller = MoodFusionController::new(
        config,
        Arc::new(connector),
        Arc::new(api),
        face_device(cli.frames_dir),
        voice_device,
    );
    let mut filters = Filters::new();

    println!("{HELP}");
    render::session(&controller.session_snapshot(), controller.status());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_state = controller.session_snapshot();
    let mut last_status = controller.status().to_string();

    loop {
        tokio::select! {
            _ = controller.pump() => {
                report_changes(&controller, &mut last_state, &mut last_status);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                run(command, &mut controller, &mut filters);
                report_changes(&controller, &mut last_state, &mut last_status);
            }
        }
    }

    controller.teardown();
    tracing::info!("Session closed");
    Ok(())
}

fn run<C, A>(command: Command, controller: &mut MoodFusionController<C, A>, filters: &mut Filters)
where
    C: moodcast::Connector + ?Sized + 'static,
    A: RecommendationApi + ?Sized + 'static,
{
    match command {
        Command::Face(on) => controller.set_enabled(Modality::Face, on),
        Command::Voice(on) => controller.set_enabled(Modality::Voice, on),
        Command::Text(text) => controller.set_text(text),
        Command::Kind(kind) => controller.set_kind(kind),
        Command::Exclude(id) => {
            let excluded = filters.toggle_genre(id);
            println!("genre {id} {}", if excluded { "excluded" } else { "included" });
        }
        Command::Genres => render::genres(filters),
        Command::Go => {
            let id = controller.request_recommendations(filters);
            tracing::debug!("submitted request {}", id);
        }
        Command::Reviews(movie_id) => {
            let api = Arc::clone(controller.api());
            tokio::spawn(async move {
                match api.reviews(movie_id).await {
                    Ok(reviews) => render::reviews(movie_id, &reviews),
                    Err(e) => println!("Failed to fetch reviews: {e}"),
                }
            });
        }
        Command::Discover => {
            let api = Arc::clone(controller.api());
            tokio::spawn(async move {
                for row in DISCOVER_ROWS.iter() {
                    match fetch_row(api.as_ref(), row).await {
                        Ok(items) => {
                            println!("== {} ==", row.title);
                            render::items(&items);
                        }
                        Err(e) => println!("Failed to fetch {}: {e}", row.title),
                    }
                }
            });
        }
        Command::Status => render::session(&controller.session_snapshot(), controller.status()),
        Command::Devices => match get_available_inputs() {
            Ok(devices) => println!("{devices}"),
            Err(e) => println!("Failed to list input devices: {e:#}"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn report_changes<C: ?Sized, A: ?Sized>(
    controller: &MoodFusionController<C, A>,
    last_state: &mut SessionState,
    last_status: &mut String,
) where
    C: moodcast::Connector + 'static,
    A: RecommendationApi + 'static,
{
    let state = controller.session_snapshot();
    if state != *last_state {
        for modality in [Modality::Face, Modality::Voice] {
            if state.mood(modality) != last_state.mood(modality) {
                println!("{modality} mood: {}", state.mood(modality));
            }
        }
        *last_state = state;
    }

    if controller.status() != last_status.as_str() {
        println!("{}", controller.status());
        if !controller.is_loading() && controller.detected_mood().is_some() {
            render::items(controller.results());
        }
        *last_status = controller.status().to_string();
    }
}
