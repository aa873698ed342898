/// Data URL encoded images
///
/// Every image that flows through the app (picked file, remote result,
/// history entries) is held as an `EncodedImage`: a mime type plus a
/// base64 payload, displayed as `data:<mime>;base64,<payload>`.

use base64::{engine::general_purpose, Engine as _};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Mime type assumed when a bare base64 payload carries no prefix
pub const DEFAULT_MIME: &str = "image/png";

/// Errors raised while parsing or decoding an encoded image
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodedImageError {
    #[error("data URL is missing the ;base64, marker")]
    NotBase64,

    #[error("image payload is empty")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Decode(String),
}

/// An immutable, cheaply clonable encoded image
///
/// The payload is shared, so cloning into iced messages or history
/// entries never copies the image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime: Arc<str>,
    payload: Arc<str>,
}

impl EncodedImage {
    /// Encode raw bytes with the given mime type
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: Arc::from(mime),
            payload: Arc::from(general_purpose::STANDARD.encode(bytes)),
        }
    }

    /// Wrap an already base64-encoded payload
    pub fn from_base64(mime: &str, payload: &str) -> Result<Self, EncodedImageError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(EncodedImageError::Empty);
        }
        Ok(Self {
            mime: Arc::from(mime),
            payload: Arc::from(payload),
        })
    }

    /// Parse either a full data URL or a bare base64 payload
    ///
    /// Any `data:<mime>;base64,` prefix is stripped. A bare payload is
    /// assumed to be PNG.
    pub fn parse(input: &str) -> Result<Self, EncodedImageError> {
        let input = input.trim();
        match input.strip_prefix("data:") {
            Some(rest) => {
                let (mime, payload) = rest
                    .split_once(";base64,")
                    .ok_or(EncodedImageError::NotBase64)?;
                let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
                Self::from_base64(mime, payload)
            }
            None => Self::from_base64(DEFAULT_MIME, input),
        }
    }

    /// Declared mime type (e.g. "image/png")
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Base64 payload with the format prefix stripped
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload back into raw bytes
    pub fn decode_bytes(&self) -> Result<Vec<u8>, EncodedImageError> {
        general_purpose::STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| EncodedImageError::Decode(e.to_string()))
    }

    /// Whether the declared type is PNG
    pub fn is_png(&self) -> bool {
        self.mime.eq_ignore_ascii_case("image/png")
    }

    /// Approximate decoded size in bytes (for logging)
    pub fn approx_size(&self) -> usize {
        self.payload.len() / 4 * 3
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

impl FromStr for EncodedImage {
    type Err = EncodedImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
