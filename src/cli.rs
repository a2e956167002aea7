// Command line interface module
// Handles launch arguments and the line commands read from stdin

use clap::{Parser, ValueEnum};
use img_ab::config::{CaptureConfig, WriteErrorPolicy};
use img_ab::state::NavCommand;
use std::path::PathBuf;

/// img-ab - compare images side by side, step through folders in lockstep
#[derive(Parser, Debug)]
#[command(name = "img-ab")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image files, or folders of images, to compare
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Directory receiving capture sessions (defaults to <Pictures>/img-ab)
    #[arg(long, value_name = "DIR")]
    pub capture_root: Option<PathBuf>,

    /// What to do when a captured frame cannot be written
    #[arg(long, value_enum, default_value_t = OnWriteError::Abort)]
    pub on_write_error: OnWriteError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnWriteError {
    /// Stop the capture session
    Abort,
    /// Log and continue with the next image
    Skip,
}

impl Args {
    pub fn capture_config(&self) -> CaptureConfig {
        let policy = match self.on_write_error {
            OnWriteError::Abort => WriteErrorPolicy::Abort,
            OnWriteError::Skip => WriteErrorPolicy::SkipAndContinue,
        };
        let root = self
            .capture_root
            .clone()
            .unwrap_or_else(CaptureConfig::default_root);
        CaptureConfig::new(root, policy)
    }
}

/// One line of input from the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A drag-and-drop or second-instance batch
    Open(Vec<PathBuf>),
    Navigate(NavCommand),
    /// Capture every displayed image in turn
    Capture,
    /// Capture the slider view of `image` against `overlay`
    CaptureSlider { image: usize, overlay: usize },
    /// Forget all folders and start a new comparison
    Reset,
}

/// Parses a command line. Key names are accepted as navigation commands.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "open" => {
            if rest.is_empty() {
                return Err("open needs at least one path".to_string());
            }
            // Tabs separate paths so that spaces inside a path survive.
            let separator = if rest.contains('\t') { '\t' } else { ' ' };
            Ok(Command::Open(
                rest.split(separator)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect(),
            ))
        }
        "capture" => Ok(Command::Capture),
        "capture-slider" => {
            let mut indices = rest.split_whitespace().map(str::parse::<usize>);
            match (indices.next(), indices.next(), indices.next()) {
                (Some(Ok(image)), Some(Ok(overlay)), None) => {
                    Ok(Command::CaptureSlider { image, overlay })
                }
                _ => Err("usage: capture-slider <image> <overlay>".to_string()),
            }
        }
        "reset" => Ok(Command::Reset),
        key => NavCommand::from_key(key)
            .map(Command::Navigate)
            .ok_or_else(|| format!("unknown command: {}", key)),
    }
}
