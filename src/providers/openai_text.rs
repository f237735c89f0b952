//! OpenAI chat-completions text adapter.

use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::{response_json_or_error, ProviderError, TextProvider};
use crate::article::TextDraft;
use crate::config::GenerationRequest;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "Eres un redactor técnico senior. Escribes artículos de blog en \
     español, claros y bien estructurados, en formato Markdown. Empiezas con un título de nivel 1 \
     y no incluyes frontmatter ni comentarios fuera del artículo.";

pub struct OpenAiText {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAiText {
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

    fn user_prompt(request: &GenerationRequest) -> String {
        let mut prompt = format!(
            "Escribe un artículo de blog sobre: {}. Entre 600 y 900 palabras, con secciones \
             claras y una conclusión práctica.",
            request.topic
        );
        if let Some(category) = &request.category {
            prompt.push_str(&format!(" Categoría del blog: {category}."));
        }
        prompt
    }
}

/// Pull the generated Markdown out of a chat-completions body.
fn extract_body(response: &Value) -> Result<String, ProviderError> {
    let content = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ProviderError::Malformed("missing choices[0].message.content".to_string())
        })?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(trimmed.to_string())
}

impl TextProvider for OpenAiText {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate(&self, request: &GenerationRequest) -> Result<TextDraft, ProviderError> {
        let payload = json!({
            "model": MODEL,
            "temperature": 0.7,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::user_prompt(request) },
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        let body = response_json_or_error(response)?;
        let markdown = extract_body(&body)?;
        Ok(TextDraft::from_body(&request.topic, markdown))
    }
}
