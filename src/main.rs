#![forbid(unsafe_code)]

mod app;
mod fs_ops;
mod model;
mod pane;
mod queue;
mod search;
mod text;
mod ui;

use std::process::ExitCode;
use std::sync::Mutex;

use ftui::{Program, ProgramConfig};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::model::VexError;
use crate::text::Text;

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vex: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), VexError> {
    let (width, height) = crossterm::terminal::size().map_err(VexError::Startup)?;
    let cwd = std::env::current_dir().map_err(VexError::Startup)?;
    let app = App::new(width, height, Text::from(cwd.to_string_lossy().as_ref()))?;

    let config = ProgramConfig::fullscreen();
    let mut program = Program::with_config(app, config).map_err(VexError::Startup)?;
    program.run().map_err(VexError::Startup)?;
    Ok(())
}

// A fullscreen TUI owns the terminal, so logs go to a file and only when
// asked for: VEX_LOG names the file, VEX_LOG_LEVEL filters (default info).
fn init_logging() {
    let Ok(path) = std::env::var("VEX_LOG") else {
        return;
    };
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("VEX_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}
