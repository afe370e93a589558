//! luna - terminal synthesizer
//!
//! Run with: cargo run -- [config.yaml]

mod app;
mod midi_input;
mod session;

use app::Luna;
use color_eyre::eyre::WrapErr;
use luna::config::Config;
use tracing::{info, Level};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Raw mode owns stdout; logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading configuration");
            Config::load(&path).wrap_err_with(|| format!("failed to load {}", path))?
        }
        None => Config::default(),
    };

    Luna::new(config).run()
}
