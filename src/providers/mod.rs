//! Provider adapters and their shared plumbing.
//!
//! Each external service sits behind one of two small traits. Adapters are
//! constructed only when their credential is present, so a missing key
//! simply shortens the fallback chain. Every adapter converts transport,
//! API, and payload problems into [`ProviderError`]; nothing here panics
//! across the trait boundary.

pub mod gemini_image;
pub mod gemini_text;
pub mod kie_image;
pub mod openai_image;
pub mod openai_text;

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::{Client, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::article::TextDraft;
use crate::config::{Credentials, GenerationRequest};
use crate::imaging::allocate::unique_image_stem;
use crate::imaging::{validate, ImageCandidate};

/// A text generation backend. First success in the chain wins.
pub trait TextProvider {
    fn name(&self) -> &str;
    fn generate(&self, request: &GenerationRequest) -> Result<TextDraft, ProviderError>;
}

/// What an image adapter needs for one attempt. Candidates are written into
/// `target_dir` through the shared allocator as they arrive.
#[derive(Debug)]
pub struct ImageRequest<'a> {
    pub prompt: &'a str,
    pub slug: &'a str,
    pub target_dir: &'a Path,
    pub count: usize,
}

/// An image generation backend. Returns the candidates it managed to write;
/// the caller validates and counts them.
pub trait ImageProvider {
    fn name(&self) -> &str;
    fn generate(&self, request: &ImageRequest<'_>) -> Result<Vec<ImageCandidate>, ProviderError>;
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider returned no usable content")]
    Empty,

    #[error("base64 payload decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text adapters in fallback order, one per configured credential.
pub fn build_text_chain(credentials: &Credentials) -> Vec<Box<dyn TextProvider>> {
    let mut chain: Vec<Box<dyn TextProvider>> = Vec::new();
    if let Some(key) = &credentials.openai_api_key {
        chain.push(Box::new(openai_text::OpenAiText::new(key.clone())));
    }
    if let Some(key) = &credentials.gemini_api_key {
        chain.push(Box::new(gemini_text::GeminiText::new(key.clone())));
    }
    chain
}

/// Image adapters in fallback order: KIE, then Gemini, then OpenAI Images.
pub fn build_image_chain(credentials: &Credentials) -> Vec<Box<dyn ImageProvider>> {
    let mut chain: Vec<Box<dyn ImageProvider>> = Vec::new();
    if let Some(key) = &credentials.kie_api_key {
        chain.push(Box::new(kie_image::KieImage::new(key.clone())));
    }
    if let Some(key) = &credentials.gemini_api_key {
        chain.push(Box::new(gemini_image::GeminiImage::new(key.clone())));
    }
    if let Some(key) = &credentials.openai_api_key {
        chain.push(Box::new(openai_image::OpenAiImage::new(key.clone())));
    }
    chain
}

/// Raw image payload plus whatever the transport told us about its type.
pub(crate) struct ImageBytes {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl ImageBytes {
    pub(crate) fn from_base64(data: &str, mime_type: Option<String>) -> Result<Self, ProviderError> {
        let bytes = BASE64.decode(data.trim())?;
        Ok(Self { bytes, mime_type })
    }
}

/// Check the status, then parse the body as JSON. Error bodies are folded
/// into the error message, truncated so a giant HTML page does not flood
/// the log.
pub(crate) fn response_json_or_error(response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body: truncate_text(&body, 512),
        });
    }
    serde_json::from_str(&body)
        .map_err(|e| ProviderError::Malformed(format!("invalid JSON payload: {e}")))
}

/// Fetch a provider-hosted image over HTTP.
pub(crate) fn download_image(client: &Client, url: &str) -> Result<ImageBytes, ProviderError> {
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body: truncate_text(&body, 512),
        });
    }
    let mime_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes()?.to_vec();
    Ok(ImageBytes { bytes, mime_type })
}

/// File extension for a payload, from its MIME type when known.
pub(crate) fn extension_for_mime(mime_type: Option<&str>) -> &'static str {
    let lowered = mime_type.unwrap_or_default().to_ascii_lowercase();
    if lowered.contains("jpeg") || lowered.contains("jpg") {
        "jpg"
    } else if lowered.contains("webp") {
        "webp"
    } else if lowered.contains("avif") {
        "avif"
    } else {
        "png"
    }
}

/// Allocate a path for `payload` under the shared naming scheme and write
/// it. The caller decides whether the result is valid.
pub(crate) fn write_candidate(
    request: &ImageRequest<'_>,
    payload: &ImageBytes,
) -> Result<ImageCandidate, ProviderError> {
    let stem = unique_image_stem(request.target_dir, request.slug, "hero")?;
    let path = stem.with_extension(extension_for_mime(payload.mime_type.as_deref()));
    fs::write(&path, &payload.bytes)?;
    Ok(ImageCandidate::from_path(path)?)
}

/// Write one payload and append it when it passes validation. A local
/// write failure costs only this payload; candidates the adapter already
/// collected survive.
pub(crate) fn collect_candidate(
    request: &ImageRequest<'_>,
    payload: &ImageBytes,
    provider: &str,
    written: &mut Vec<ImageCandidate>,
) {
    let candidate = match write_candidate(request, payload) {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!(provider, error = %e, "failed writing image candidate");
            return;
        }
    };
    if validate::is_valid(&candidate) {
        written.push(candidate);
    } else {
        warn!(
            provider,
            path = %candidate.path.display(),
            bytes = candidate.byte_len,
            "discarding undersized candidate"
        );
    }
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

/// The KIE envelope, decoded from whichever of its known shapes matched.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum KiePayload {
    /// A single hosted file.
    Url(String),
    /// A list of items, each hosted or inline.
    Items(Vec<KieItem>),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum KieItem {
    Url(String),
    Base64(String),
}

/// Probe the response body against the known envelope shapes, in fixed
/// priority order: top-level `fileUrl`, then `data.fileUrl`, then a `data`
/// array of items carrying `fileUrl` / `b64` / `b64_json`.
pub(crate) fn probe_kie_payload(body: &Value) -> Option<KiePayload> {
    if let Some(url) = body.get("fileUrl").and_then(Value::as_str) {
        return Some(KiePayload::Url(url.to_string()));
    }
    if let Some(url) = body
        .get("data")
        .and_then(|data| data.get("fileUrl"))
        .and_then(Value::as_str)
    {
        return Some(KiePayload::Url(url.to_string()));
    }
    if let Some(items) = body.get("data").and_then(Value::as_array) {
        let decoded: Vec<KieItem> = items.iter().filter_map(probe_kie_item).collect();
        if !decoded.is_empty() {
            return Some(KiePayload::Items(decoded));
        }
    }
    None
}

fn probe_kie_item(item: &Value) -> Option<KieItem> {
    if let Some(url) = item.get("fileUrl").and_then(Value::as_str) {
        return Some(KieItem::Url(url.to_string()));
    }
    for key in ["b64", "b64_json"] {
        if let Some(b64) = item.get(key).and_then(Value::as_str) {
            return Some(KieItem::Base64(b64.to_string()));
        }
    }
    None
}
