mod app;
mod commands;
mod config;
mod host;
mod logging;
mod recording;
mod ui;

use std::process;

fn main() {
    if let Err(e) = app::run() {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
