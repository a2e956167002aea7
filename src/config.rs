//! Application configuration constants and capture settings.

use image::ImageFormat;
use std::path::PathBuf;

/// Supported image file extensions for scanning directories.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "webp", "gif"];

/// Directory under the user's pictures folder that holds capture sessions.
pub const APP_DIR_NAME: &str = "img-ab";

/// Prefix of every capture session directory.
pub const CAPTURE_DIR_PREFIX: &str = "capture-";

/// Timestamp layout appended to [`CAPTURE_DIR_PREFIX`].
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of read assets kept between folder rescans.
pub const ASSET_CACHE_CAPACITY: usize = 256;

/// Upper bound the asset cache may grow to when a folder set holds more
/// images than [`ASSET_CACHE_CAPACITY`].
pub const MAX_ASSET_CACHE_CAPACITY: usize = 8192;

/// Maps a file extension to one of the supported image formats.
///
/// Matching is case-insensitive. Anything outside the five supported
/// extensions yields `None`.
pub fn format_from_extension(ext: &str) -> Option<ImageFormat> {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::WebP),
        "gif" => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// What the capture sequencer does when a frame cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteErrorPolicy {
    /// End the session and hand the error back to the caller.
    #[default]
    Abort,
    /// Log the failure and move on to the next image.
    SkipAndContinue,
}

/// Settings for screen capture sessions.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Base directory in which `capture-<timestamp>` directories are created.
    pub root: PathBuf,
    pub on_write_error: WriteErrorPolicy,
}

impl CaptureConfig {
    pub fn new(root: PathBuf, on_write_error: WriteErrorPolicy) -> Self {
        Self {
            root,
            on_write_error,
        }
    }

    /// `<pictures>/img-ab`, falling back to `~/Pictures/img-ab` when the
    /// platform reports no pictures directory.
    pub fn default_root() -> PathBuf {
        dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
            .unwrap_or_else(|| PathBuf::from("Pictures"))
            .join(APP_DIR_NAME)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new(Self::default_root(), WriteErrorPolicy::default())
    }
}
