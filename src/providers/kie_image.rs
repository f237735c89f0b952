//! KIE image adapter.
//!
//! The KIE API wraps results in one of several envelopes depending on the
//! backing model; [`super::probe_kie_payload`] decodes them in a fixed
//! priority order. Hosted files are downloaded, inline payloads are base64
//! decoded.

use reqwest::blocking::Client;
use serde_json::json;
use tracing::warn;

use super::{
    collect_candidate, download_image, probe_kie_payload, response_json_or_error, ImageBytes,
    ImageProvider, ImageRequest, KieItem, KiePayload, ProviderError,
};
use crate::imaging::ImageCandidate;

const DEFAULT_BASE_URL: &str = "https://api.kie.ai";

pub struct KieImage {
    api_key: String,
    base_url: String,
    client: Client,
}

impl KieImage {
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

    fn fetch_item(&self, item: &KieItem) -> Result<ImageBytes, ProviderError> {
        match item {
            KieItem::Url(url) => download_image(&self.client, url),
            KieItem::Base64(b64) => ImageBytes::from_base64(b64, None),
        }
    }
}

impl ImageProvider for KieImage {
    fn name(&self) -> &str {
        "kie"
    }

    fn generate(&self, request: &ImageRequest<'_>) -> Result<Vec<ImageCandidate>, ProviderError> {
        let payload = json!({
            "prompt": request.prompt,
            "aspectRatio": "16:9",
            "n": request.count,
        });
        let response = self
            .client
            .post(format!("{}/api/v1/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        let body = response_json_or_error(response)?;

        let items: Vec<KieItem> = match probe_kie_payload(&body) {
            Some(KiePayload::Url(url)) => vec![KieItem::Url(url)],
            Some(KiePayload::Items(items)) => items,
            None => {
                return Err(ProviderError::Malformed(
                    "no known envelope shape matched".to_string(),
                ));
            }
        };

        let mut written: Vec<ImageCandidate> = Vec::new();
        for item in &items {
            if written.len() >= request.count {
                break;
            }
            let payload = match self.fetch_item(item) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "failed fetching KIE image item");
                    continue;
                }
            };
            collect_candidate(request, &payload, self.name(), &mut written);
        }

        if written.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(written)
    }
}
