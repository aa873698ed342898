/// Image data module
///
/// This module handles:
/// - The data URL representation shared by every image (encoded.rs)
/// - Reading picked or dropped files (intake.rs)
/// - Saving results as PNG (export.rs)

pub mod encoded;
pub mod export;
pub mod intake;

pub use encoded::{EncodedImage, DEFAULT_MIME};
pub use export::ExportError;
pub use intake::IntakeError;
