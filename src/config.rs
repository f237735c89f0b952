//! Run configuration: generation inputs, provider credentials, and output
//! locations.
//!
//! Credentials are an explicit struct rather than ambient environment reads
//! scattered through the adapters. `main` builds one from the environment;
//! tests build one with literals. An absent key means the matching adapters
//! are skipped, never an error.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Immutable inputs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Article topic, also the source of the slug and the title fallback.
    pub topic: String,
    /// Visual style for the hero image ("fotográfico", "ilustración", ...).
    pub style: String,
    /// Accent color name from the placeholder palette.
    pub accent: String,
    /// Free-form key elements to work into the image prompt.
    pub details: String,
    /// Frontmatter category.
    pub category: Option<String>,
    /// How many hero candidates to request from the image adapters.
    pub image_count: usize,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            style: "fotográfico".to_string(),
            accent: "azul".to_string(),
            details: String::new(),
            category: None,
            image_count: 1,
        }
    }

    /// Prompt sent to every image adapter for the hero illustration.
    pub fn hero_prompt(&self) -> String {
        let mut prompt = format!(
            "Genera una ilustración/fotografía digital para un artículo web sobre {}. \
             Estilo: {}, profesional, fondo limpio, composición para cabecera de blog. \
             Formato 16:9. Paleta con acento {}.",
            self.topic, self.style, self.accent
        );
        if !self.details.trim().is_empty() {
            prompt.push_str(&format!(" Elementos clave: {}.", self.details.trim()));
        }
        prompt
    }
}

/// API keys for the external providers. `None` disables the adapter.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub kie_api_key: Option<String>,
}

impl Credentials {
    /// Read keys from the environment. Empty or whitespace-only values count
    /// as absent.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            gemini_api_key: non_empty_env("GEMINI_API_KEY"),
            kie_api_key: non_empty_env("KIE_API_KEY"),
        }
    }

    /// No providers configured. Every run falls through to the local
    /// template and placeholder.
    pub fn none() -> Self {
        Self::default()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}

/// Where documents and images land on disk, and how images are referenced
/// from documents.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    /// Directory for `<slug>.mdx` documents.
    pub content_dir: PathBuf,
    /// Base directory for per-slug image subdirectories.
    pub images_dir: PathBuf,
    /// Web path prefix that maps onto `images_dir`.
    pub web_prefix: String,
}

impl OutputLayout {
    pub fn new(content_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            images_dir: images_dir.into(),
            web_prefix: "/images/blog".to_string(),
        }
    }

    pub fn article_path(&self, slug: &str) -> PathBuf {
        self.content_dir.join(format!("{slug}.mdx"))
    }

    pub fn image_dir(&self, slug: &str) -> PathBuf {
        self.images_dir.join(slug)
    }

    /// Web-relative reference for an image file under `image_dir(slug)`.
    pub fn web_image_path(&self, slug: &str, file_name: &str) -> String {
        format!("{}/{}/{}", self.web_prefix, slug, file_name)
    }

    /// Create both base directories.
    pub fn bootstrap(&self) -> io::Result<()> {
        fs::create_dir_all(&self.content_dir)?;
        fs::create_dir_all(&self.images_dir)?;
        Ok(())
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(
            Path::new("content").join("blog"),
            Path::new("public").join("images").join("blog"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_prompt_includes_topic_style_and_accent() {
        let mut request = GenerationRequest::new("domótica");
        request.style = "ilustración".to_string();
        request.accent = "verde".to_string();
        let prompt = request.hero_prompt();
        assert!(prompt.contains("domótica"));
        assert!(prompt.contains("ilustración"));
        assert!(prompt.contains("acento verde"));
        assert!(!prompt.contains("Elementos clave"));
    }

    #[test]
    fn hero_prompt_appends_details_when_present() {
        let mut request = GenerationRequest::new("domótica");
        request.details = "sensores, panel central".to_string();
        assert!(request
            .hero_prompt()
            .contains("Elementos clave: sensores, panel central."));
    }

    #[test]
    fn default_request_matches_cli_defaults() {
        let request = GenerationRequest::new("x");
        assert_eq!(request.style, "fotográfico");
        assert_eq!(request.accent, "azul");
        assert_eq!(request.image_count, 1);
        assert!(request.category.is_none());
    }

    #[test]
    fn layout_paths() {
        let layout = OutputLayout::new("content/blog", "public/images/blog");
        assert_eq!(
            layout.article_path("mi-slug"),
            PathBuf::from("content/blog/mi-slug.mdx")
        );
        assert_eq!(
            layout.image_dir("mi-slug"),
            PathBuf::from("public/images/blog/mi-slug")
        );
        assert_eq!(
            layout.web_image_path("mi-slug", "mi-slug-hero-001.avif"),
            "/images/blog/mi-slug/mi-slug-hero-001.avif"
        );
    }

    #[test]
    fn credentials_none_disables_everything() {
        let credentials = Credentials::none();
        assert!(credentials.openai_api_key.is_none());
        assert!(credentials.gemini_api_key.is_none());
        assert!(credentials.kie_api_key.is_none());
    }
}
