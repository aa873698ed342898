/// User interface module
///
/// - `canvas.rs` - editor surface: fit-to-container image plus marking strokes
/// - `history.rs` - sidebar of past results
/// - `status.rs` - header status dot and label

pub mod canvas;
pub mod history;
pub mod status;

use iced::widget::image::Handle;

use crate::media::EncodedImage;

/// Build a renderer handle for an encoded image
///
/// A payload that fails to decode yields an empty handle, which renders
/// as nothing.
pub fn preview_handle(image: &EncodedImage) -> Handle {
    match image.decode_bytes() {
        Ok(bytes) => Handle::from_bytes(bytes),
        Err(e) => {
            log::warn!("⚠️  Could not decode preview: {e}");
            Handle::from_bytes(Vec::<u8>::new())
        }
    }
}
