/// Image intake
///
/// Reads a user-selected file fully into memory and wraps it as an
/// `EncodedImage`. No validation beyond the picker's filter; files that
/// are not really images fail later when the editor decodes them.

use image::ImageFormat;
use std::path::{Path, PathBuf};

use super::encoded::EncodedImage;

/// Extensions offered by the file picker
pub const PICKER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// Mime used when neither the bytes nor the extension identify the file
const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Show the native file picker filtered to image files
pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Upload an image")
        .add_filter("Images", PICKER_EXTENSIONS)
        .pick_file()
}

/// Read an image file into an `EncodedImage`
pub async fn read_image(path: PathBuf) -> Result<EncodedImage, IntakeError> {
    let bytes = tokio::fs::read(&path).await.map_err(|e| IntakeError::Read {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let mime = detect_mime(&path, &bytes);
    log::info!(
        "📥 Read {} ({} KB, {})",
        path.display(),
        bytes.len() / 1024,
        mime
    );

    Ok(EncodedImage::from_bytes(mime, &bytes))
}

/// Sniff the mime type from magic bytes, then from the extension
fn detect_mime(path: &Path, bytes: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }

    path.extension()
        .and_then(ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}
