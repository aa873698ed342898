/// Result export (the "Download" action)
///
/// Saves the current result image as a PNG file named with a timestamp.

use chrono::{DateTime, Utc};
use image::ImageFormat;
use std::io::Cursor;
use std::path::PathBuf;

use super::encoded::EncodedImage;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("result image could not be decoded: {0}")]
    Decode(String),

    #[error("failed to encode PNG: {0}")]
    Encode(String),

    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Task join error: {0}")]
    Join(String),
}

/// Default filename for a saved result, e.g. `magic-eraser-1718000000000.png`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("magic-eraser-{}.png", now.timestamp_millis())
}

/// Show the native save dialog pre-filled with `file_name`
pub fn pick_save_path(file_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Save Image")
        .set_file_name(file_name)
        .add_filter("PNG image", &["png"])
        .save_file()
}

/// Write `image` to `path` as PNG
///
/// PNG payloads are written untouched; anything else is re-encoded.
/// Returns the path written.
pub async fn save_png(image: EncodedImage, path: PathBuf) -> Result<PathBuf, ExportError> {
    let bytes = image
        .decode_bytes()
        .map_err(|e| ExportError::Decode(e.to_string()))?;

    let png = if image.is_png() {
        bytes
    } else {
        // Decoding + encoding is CPU-bound
        tokio::task::spawn_blocking(move || reencode_png(&bytes))
            .await
            .map_err(|e| ExportError::Join(e.to_string()))??
    };

    tokio::fs::write(&path, &png)
        .await
        .map_err(|e| ExportError::Write {
            path: path.clone(),
            message: e.to_string(),
        })?;

    log::info!("💾 Saved result to {} ({} KB)", path.display(), png.len() / 1024);
    Ok(path)
}

fn reencode_png(bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| ExportError::Decode(e.to_string()))?;

    let mut out = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(out)
}
