use std::sync::Arc;

use super::error::EditError;
use super::protocol::{service_error_message, GenerateContentRequest, GenerateContentResponse};
use crate::config::RemoteConfig;
use crate::media::EncodedImage;

/// Client for the Gemini image-editing endpoint
///
/// Cheap to clone: the HTTP connection pool and settings are shared, so
/// a clone can be moved into each edit task.
#[derive(Clone)]
pub struct RemoteEditClient {
    http: reqwest::Client,
    api_key: Option<Arc<str>>,
    url: Arc<str>,
}

impl RemoteEditClient {
    /// Build the client from configuration
    ///
    /// A missing API key is not an error here; it fails each edit instead.
    pub fn new(config: &RemoteConfig) -> Result<Self, EditError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| EditError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.api_key.as_deref().map(Arc::from),
            url: Arc::from(generate_content_url(&config.endpoint, &config.model)),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send `image` with the watermark-removal instruction and return the
    /// edited image. One attempt, no retry.
    pub async fn remove_watermark(&self, image: EncodedImage) -> Result<EncodedImage, EditError> {
        let api_key = self.api_key.as_deref().ok_or(EditError::MissingApiKey)?;

        log::info!(
            "🪄 Sending {} KB {} image to {}",
            image.approx_size() / 1024,
            image.mime(),
            self.url
        );

        let body = GenerateContentRequest::watermark_removal(&image);
        let response = self
            .http
            .post(self.url.as_ref())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EditError::Service {
                status: status.as_u16(),
                message: service_error_message(status, &text),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let result = parsed.into_image()?;

        log::info!("✅ Received {} KB {} result", result.approx_size() / 1024, result.mime());
        Ok(result)
    }
}

impl std::fmt::Debug for RemoteEditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the key
        f.debug_struct("RemoteEditClient")
            .field("url", &self.url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

/// `{endpoint}/models/{model}:generateContent`
pub fn generate_content_url(endpoint: &str, model: &str) -> String {
    format!("{}/models/{}:generateContent", endpoint.trim_end_matches('/'), model)
}
