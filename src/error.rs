//! Unified error types for the comparison core.

use std::path::PathBuf;
use thiserror::Error;

/// Application-specific errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Error reading an image file into an asset
    #[error("image read error: {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File extension is not one of the supported formats
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Error scanning directory for image files
    #[error("directory scan error: {}: {source}", path.display())]
    DirectoryScan {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Error creating the capture root or a session directory
    #[error("capture directory error: {}: {source}", path.display())]
    CaptureDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The external renderer could not provide a frame
    #[error("frame capture error: {0}")]
    FrameCapture(String),
    /// Error encoding a captured frame
    #[error("frame encode error: {0}")]
    FrameEncode(#[from] image::ImageError),
    /// Error writing a captured frame to disk
    #[error("capture write error: {}: {source}", path.display())]
    CaptureWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A capture command arrived that the current capture state cannot accept
    #[error("capture rejected: {0}")]
    CaptureRejected(String),
}

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, AppError>;
