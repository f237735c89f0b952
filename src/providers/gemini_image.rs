//! Gemini image adapter.
//!
//! The image-capable Gemini models churn; two known identifiers are tried
//! in order and a failure of the first is only a debug-level event. Images
//! arrive inline as base64 parts, under camelCase or snake_case keys
//! depending on API vintage, so both spellings are probed.

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{
    collect_candidate, response_json_or_error, ImageBytes, ImageProvider, ImageRequest,
    ProviderError,
};
use crate::imaging::ImageCandidate;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODELS: &[&str] = &[
    "gemini-2.5-flash-image-preview",
    "gemini-2.0-flash-preview-image-generation",
];

pub struct GeminiImage {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiImage {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: Client::new(),
        }
    }

    fn call_model(&self, model: &str, prompt: &str) -> Result<Value, ProviderError> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] },
        });
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        let response = self.client.post(url).json(&payload).send()?;
        response_json_or_error(response)
    }
}

/// Inline image payloads from every candidate part, camelCase and
/// snake_case both accepted.
fn extract_inline_images(response: &Value) -> Vec<(String, Option<String>)> {
    let mut images = Vec::new();
    let Some(candidates) = response.get("candidates").and_then(Value::as_array) else {
        return images;
    };
    for candidate in candidates {
        let Some(parts) = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
        else {
            continue;
        };
        for part in parts {
            let Some(inline) = part.get("inlineData").or_else(|| part.get("inline_data")) else {
                continue;
            };
            let Some(data) = inline.get("data").and_then(Value::as_str) else {
                continue;
            };
            let mime = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .map(str::to_string);
            images.push((data.to_string(), mime));
        }
    }
    images
}

impl ImageProvider for GeminiImage {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &ImageRequest<'_>) -> Result<Vec<ImageCandidate>, ProviderError> {
        let mut written: Vec<ImageCandidate> = Vec::new();
        let mut last_error: Option<ProviderError> = None;

        for model in MODELS {
            let body = match self.call_model(model, request.prompt) {
                Ok(body) => body,
                Err(e) => {
                    debug!(model = %model, error = %e, "Gemini image model attempt failed");
                    last_error = Some(e);
                    continue;
                }
            };

            for (data, mime) in extract_inline_images(&body) {
                if written.len() >= request.count {
                    break;
                }
                let payload = match ImageBytes::from_base64(&data, mime) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(model = %model, error = %e, "discarding undecodable inline image");
                        continue;
                    }
                };
                collect_candidate(request, &payload, self.name(), &mut written);
            }
            if written.len() >= request.count {
                break;
            }
        }

        if written.is_empty() {
            return Err(last_error.unwrap_or(ProviderError::Empty));
        }
        Ok(written)
    }
}
