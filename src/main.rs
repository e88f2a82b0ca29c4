mod app;
mod clock;
mod demo;
mod input;
mod render;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use roomplan::config::RoomConfig;
use roomplan::event::{read_events, replay};
use roomplan::grid::ImageSize;
use roomplan::state::PlacementStore;

use app::{App, AppConfig};

/// Image size assumed by headless replay until an `image` event says otherwise
const REPLAY_IMAGE_SIZE: ImageSize = ImageSize {
    width: 1200.0,
    height: 900.0,
};

/// Roomplan: snap furniture onto a room photo's floor and walls
///
/// Pick items from the inventory, drag the ghost across the cell grid and
/// commit placements. Gestures can also come from a JSON-lines file or the
/// built-in demo.
#[derive(Parser, Debug)]
#[command(name = "roomplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gesture file to watch (JSON lines)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Run a simulated decorating session
    #[arg(long, conflicts_with = "file")]
    demo: bool,

    /// Room configuration (surfaces, view, catalog) as JSON
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Apply a gesture file without the UI and print the resulting draft as JSON
    #[arg(long, value_name = "FILE", conflicts_with_all = ["file", "demo"])]
    replay: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Hide cell grid lines
    #[arg(long)]
    no_grid_lines: bool,

    /// Override the number of cells per surface side
    #[arg(long, value_name = "N")]
    divisions: Option<u32>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_file.as_deref(), cli.replay.is_some()) {
        eprintln!("Error: could not open log file: {}", e);
        std::process::exit(1);
    }

    let mut room = match cli.config.as_ref().map(RoomConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(divisions) = cli.divisions {
        room.divisions = divisions;
        if let Err(e) = room.validate() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    if let Some(path) = cli.replay {
        return run_replay(&path, &room);
    }

    let config = AppConfig {
        file_path: cli.file,
        demo_mode: cli.demo,
        show_grid_lines: !cli.no_grid_lines,
        room,
    };

    let mut app = App::new(config);
    if let Err(e) = app.run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to `--log-file` when given. Headless runs fall back to stderr;
/// the TUI owns the terminal, so without a file it logs nothing.
fn init_tracing(log_file: Option<&Path>, headless: bool) -> std::io::Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roomplan=info"));

    if let Some(path) = log_file {
        let file = File::create(path)?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else if headless {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .try_init();
    }
    Ok(())
}

fn run_replay(path: &Path, room: &RoomConfig) -> std::io::Result<()> {
    let events = match read_events(path) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut store = PlacementStore::new(room.layout());
    store.set_catalog(room.catalog.iter().cloned());
    store.set_view(room.view);
    store.set_image_size(REPLAY_IMAGE_SIZE);

    let applied = replay(&mut store, &events);
    tracing::info!(events = events.len(), applied, "replay finished");

    let json = store.draft_snapshot_json().map_err(std::io::Error::other)?;
    println!("{}", json);
    Ok(())
}
