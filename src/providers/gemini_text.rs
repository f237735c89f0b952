//! Gemini generateContent text adapter.

use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::{response_json_or_error, ProviderError, TextProvider};
use crate::article::TextDraft;
use crate::config::GenerationRequest;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.0-flash";

pub struct GeminiText {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiText {
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

/// Concatenate the text parts of the first candidate.
fn extract_body(response: &Value) -> Result<String, ProviderError> {
    let parts = response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ProviderError::Malformed("missing candidates[0].content.parts".to_string())
        })?;

    let mut body = String::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            body.push_str(text);
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(trimmed.to_string())
}

impl TextProvider for GeminiText {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerationRequest) -> Result<TextDraft, ProviderError> {
        let prompt = format!(
            "Escribe un artículo de blog en español sobre: {}. Formato Markdown, con un título \
             de nivel 1, secciones claras y una conclusión práctica. No incluyas frontmatter.",
            request.topic
        );
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, MODEL, self.api_key
        );
        let response = self.client.post(url).json(&payload).send()?;
        let body = response_json_or_error(response)?;
        let markdown = extract_body(&body)?;
        Ok(TextDraft::from_body(&request.topic, markdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn concatenates_text_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "# Título\n" },
                { "inlineData": { "mimeType": "image/png", "data": "ignored" } },
                { "text": "\nCuerpo." }
            ]}}]
        });
        assert_eq!(extract_body(&body).unwrap(), "# Título\n\nCuerpo.");
    }

    #[test]
    fn no_text_parts_is_empty() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "x" } }
            ]}}]
        });
        assert!(matches!(extract_body(&body), Err(ProviderError::Empty)));
    }

    #[test]
    fn missing_candidates_is_malformed() {
        assert!(matches!(
            extract_body(&json!({})),
            Err(ProviderError::Malformed(_))
        ));
    }
}
