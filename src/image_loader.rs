//! Reading image files into inline-encoded assets for the presentation layer.

use crate::config::format_from_extension;
use crate::error::{AppError, Result};
use base64::{Engine as _, engine::general_purpose};
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// An image ready to hand to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// `data:<mime>;base64,<bytes>`
    pub data: String,
    pub display_name: String,
}

impl ImageAsset {
    /// Builds an asset from raw file bytes. The format is taken from the
    /// extension of `display_name`.
    pub fn from_bytes(display_name: &str, bytes: &[u8]) -> Result<Self> {
        let format = Path::new(display_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(format_from_extension)
            .ok_or_else(|| AppError::UnsupportedFormat(display_name.into()))?;

        let data = format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            general_purpose::STANDARD.encode(bytes)
        );

        Ok(Self {
            data,
            display_name: display_name.to_string(),
        })
    }

    /// Decodes the inline payload back into the original file bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.data.split_once(";base64,")?;
        general_purpose::STANDARD.decode(payload).ok()
    }
}

/// Reads `path` into an [`ImageAsset`].
///
/// Only the extension is inspected; the bytes are not decoded.
pub fn load_asset(path: &Path) -> Result<ImageAsset> {
    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::UnsupportedFormat(path.to_path_buf()))?;

    if !crate::file_utils::is_supported_image(path) {
        return Err(AppError::UnsupportedFormat(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| AppError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    let asset = ImageAsset::from_bytes(&display_name, &bytes)?;
    debug!(
        "Read {} ({} bytes, data length {})",
        path.display(),
        bytes.len(),
        asset.data.len()
    );
    Ok(asset)
}

/// Like [`load_asset`] but logs and swallows the failure.
pub fn try_load_asset(path: &Path) -> Option<ImageAsset> {
    match load_asset(path) {
        Ok(asset) => Some(asset),
        Err(e) => {
            warn!("Skipped image {}: {}", path.display(), e);
            None
        }
    }
}
