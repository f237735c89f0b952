//! OpenAI Images adapter (`/v1/images/generations`).

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::warn;

use super::{
    collect_candidate, download_image, response_json_or_error, ImageBytes, ImageProvider,
    ImageRequest, ProviderError,
};
use crate::imaging::ImageCandidate;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const MODEL: &str = "gpt-image-1";

pub struct OpenAiImage {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAiImage {
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
}

/// Each generated image arrives as `b64_json` inline data or as a hosted
/// `url`, depending on the model and request options.
enum GeneratedItem {
    Base64(String),
    Url(String),
}

fn extract_items(response: &Value) -> Vec<GeneratedItem> {
    let mut items = Vec::new();
    let Some(data) = response.get("data").and_then(Value::as_array) else {
        return items;
    };
    for entry in data {
        if let Some(b64) = entry.get("b64_json").and_then(Value::as_str) {
            items.push(GeneratedItem::Base64(b64.to_string()));
        } else if let Some(url) = entry.get("url").and_then(Value::as_str) {
            items.push(GeneratedItem::Url(url.to_string()));
        }
    }
    items
}

impl ImageProvider for OpenAiImage {
    fn name(&self) -> &str {
        "openai-images"
    }

    fn generate(&self, request: &ImageRequest<'_>) -> Result<Vec<ImageCandidate>, ProviderError> {
        let payload = json!({
            "model": MODEL,
            "prompt": request.prompt,
            "n": request.count,
            "size": "1536x1024",
        });
        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        let body = response_json_or_error(response)?;

        let mut written: Vec<ImageCandidate> = Vec::new();
        for item in extract_items(&body) {
            if written.len() >= request.count {
                break;
            }
            let payload = match item {
                GeneratedItem::Base64(b64) => {
                    match ImageBytes::from_base64(&b64, Some("image/png".to_string())) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(error = %e, "discarding undecodable OpenAI image payload");
                            continue;
                        }
                    }
                }
                GeneratedItem::Url(url) => match download_image(&self.client, &url) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(%url, error = %e, "failed downloading OpenAI image");
                        continue;
                    }
                },
            };
            collect_candidate(request, &payload, self.name(), &mut written);
        }

        if written.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(written)
    }
}
