/// Remote edit module
///
/// The boundary to the Gemini image-editing service:
/// - `client.rs` - HTTP client issuing one request per edit
/// - `protocol.rs` - `generateContent` request/response types
/// - `error.rs` - failures surfaced to the user

pub mod client;
pub mod error;
pub mod protocol;

pub use client::RemoteEditClient;
pub use error::EditError;
