/// Gemini `generateContent` wire types
///
/// Only the fields this app reads or writes are modelled. Unknown
/// response fields are ignored by serde.

use serde::{Deserialize, Serialize};

use super::error::EditError;
use crate::media::{EncodedImage, DEFAULT_MIME};

/// Instruction sent alongside every image
pub const INSTRUCTION: &str = "Remove all watermarks, logos, brand names, and overlaid text from this image. Reconstruct the background texture and lighting seamlessly so the image looks completely natural and professional. Return ONLY the edited image.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Body of a non-success response: `{ "error": { "code", "message", "status" } }`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

impl GenerateContentRequest {
    /// One user turn: the image followed by the fixed instruction
    pub fn watermark_removal(image: &EncodedImage) -> Self {
        // The service only accepts image types; unidentified files go as PNG
        let mime = if image.mime().starts_with("image/") {
            image.mime()
        } else {
            DEFAULT_MIME
        };

        Self {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: Some(mime.to_string()),
                            data: image.payload().to_string(),
                        }),
                    },
                    Part {
                        text: Some(INSTRUCTION.to_string()),
                        inline_data: None,
                    },
                ],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Take the first inline image of the first candidate
    pub fn into_image(self) -> Result<EncodedImage, EditError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(EditError::NoCandidate)?;

        let inline = candidate
            .content
            .unwrap_or_default()
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
            .ok_or(EditError::NoImagePart)?;

        let mime = inline.mime_type.as_deref().unwrap_or(DEFAULT_MIME);
        let image =
            EncodedImage::from_base64(mime, &inline.data).map_err(|_| EditError::NoImagePart)?;
        image
            .decode_bytes()
            .map_err(|e| EditError::InvalidResponse(e.to_string()))?;
        Ok(image)
    }
}

/// Human-readable message for a failed HTTP status
///
/// Prefers the service's own `error.message`, then the raw body, then
/// the status line.
pub fn service_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if !parsed.error.message.is_empty() {
            return parsed.error.message;
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    format!("Request failed with status {status}")
}
