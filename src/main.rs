// img-ab - headless image comparison driver
// Resolves launch paths, then reads commands from stdin and prints display updates

mod cli;
mod startup;

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::io::{self, BufRead};

fn main() -> Result<()> {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let args = cli::Args::parse();
    let capture_config = args.capture_config();
    info!(
        "Starting img-ab with {} paths, captures in {}",
        args.paths.len(),
        capture_config.root.display()
    );

    let stdout = io::stdout();
    let mut viewer = startup::Viewer::new(capture_config, stdout.lock());
    viewer.open(&args.paths)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match cli::parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                error!("{}", e);
                continue;
            }
        };
        match viewer.handle(command) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => error!("{:#}", e),
        }
    }

    info!("Closing with {} images displayed", viewer.displayed().len());
    Ok(())
}
