//! The generation pipeline: one run takes a topic to a written document
//! plus, in the best case, a canonical hero image.
//!
//! The flow is a straight line with fallbacks at each stage: slug, then the
//! text chain (first success wins, template as the floor), then the image
//! chain (validated candidates up to the requested count, placeholder as
//! the floor), then normalization and assembly. Adapter and normalization
//! failures are logged and absorbed; only filesystem failures writing the
//! document itself abort a run.
//!
//! Runs are single-threaded and there is no cross-process lock per slug;
//! two simultaneous runs on the same topic can interleave sequence numbers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::article::{template_article, TextDraft};
use crate::config::{Credentials, GenerationRequest, OutputLayout};
use crate::document::{write_document, Frontmatter};
use crate::imaging::normalize::{to_canonical, Quality};
use crate::imaging::{placeholder, validate, ImageCandidate};
use crate::providers::{
    build_image_chain, build_text_chain, ImageProvider, ImageRequest, TextProvider,
};
use crate::slug::slugify;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("topic produced an empty slug")]
    EmptySlug,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// How the run's hero image was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// An external adapter supplied it.
    Provider,
    /// Every adapter failed; the local renderer supplied it.
    Placeholder,
    /// Even the renderer failed; the document has no image reference.
    None,
}

/// What one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub document_path: PathBuf,
    pub slug: String,
    pub title: String,
    pub images: Vec<PathBuf>,
    pub image_outcome: ImageOutcome,
}

pub struct Pipeline {
    text_providers: Vec<Box<dyn TextProvider>>,
    image_providers: Vec<Box<dyn ImageProvider>>,
    layout: OutputLayout,
}

impl Pipeline {
    pub fn new(credentials: &Credentials, layout: OutputLayout) -> Self {
        Self {
            text_providers: build_text_chain(credentials),
            image_providers: build_image_chain(credentials),
            layout,
        }
    }

    /// Construct with explicit chains. Used by tests to inject stubs.
    pub fn with_providers(
        text_providers: Vec<Box<dyn TextProvider>>,
        image_providers: Vec<Box<dyn ImageProvider>>,
        layout: OutputLayout,
    ) -> Self {
        Self {
            text_providers,
            image_providers,
            layout,
        }
    }

    pub fn run(&self, request: &GenerationRequest) -> Result<RunReport, PipelineError> {
        let slug = slugify(&request.topic);
        if slug.is_empty() {
            return Err(PipelineError::EmptySlug);
        }
        info!(topic = %request.topic, %slug, "starting generation run");

        let draft = self.generate_text(request);
        let candidates = self.generate_images(request, &slug);
        let (finals, selected, outcome) = self.select_image(request, &slug, candidates);

        let web_image = selected.as_ref().and_then(|candidate| {
            candidate
                .file_name()
                .map(|name| self.layout.web_image_path(&slug, &name))
        });

        let frontmatter =
            Frontmatter::new(&draft.title, &slug, request.category.as_deref(), web_image);
        let document_path = self.layout.article_path(&slug);
        write_document(&document_path, &frontmatter, &draft.body)?;
        info!(path = %document_path.display(), outcome = ?outcome, "document written");

        let image_paths: Vec<PathBuf> = finals.iter().map(|c| c.path.clone()).collect();

        Ok(RunReport {
            document_path,
            slug,
            title: frontmatter.title,
            images: image_paths,
            image_outcome: outcome,
        })
    }

    /// First adapter success wins; exhaustion falls back to the template.
    fn generate_text(&self, request: &GenerationRequest) -> TextDraft {
        for provider in &self.text_providers {
            match provider.generate(request) {
                Ok(draft) => {
                    info!(provider = provider.name(), title = %draft.title, "text adapter succeeded");
                    return draft;
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "text adapter failed");
                }
            }
        }
        info!("all text adapters exhausted, using local template");
        template_article(request)
    }

    /// Collect validated candidates from the chain, stopping at the
    /// requested count. Adapters already validate what they write; the
    /// filter here keeps the guarantee independent of adapter behavior.
    fn generate_images(&self, request: &GenerationRequest, slug: &str) -> Vec<ImageCandidate> {
        let prompt = request.hero_prompt();
        let target_dir = self.layout.image_dir(slug);
        let mut collected: Vec<ImageCandidate> = Vec::new();

        for provider in &self.image_providers {
            if collected.len() >= request.image_count {
                break;
            }
            let image_request = ImageRequest {
                prompt: &prompt,
                slug,
                target_dir: &target_dir,
                count: request.image_count - collected.len(),
            };
            match provider.generate(&image_request) {
                Ok(candidates) => {
                    let mut accepted = 0usize;
                    for candidate in candidates {
                        if collected.len() >= request.image_count {
                            break;
                        }
                        if validate::is_valid(&candidate) {
                            collected.push(candidate);
                            accepted += 1;
                        } else {
                            warn!(
                                provider = provider.name(),
                                path = %candidate.path.display(),
                                bytes = candidate.byte_len,
                                "discarding invalid image candidate"
                            );
                        }
                    }
                    info!(provider = provider.name(), accepted, "image adapter finished");
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "image adapter failed");
                }
            }
        }
        collected
    }

    /// Normalize the collected candidates and pick the first usable one,
    /// falling back to the placeholder renderer. Returns all final on-disk
    /// images, the selected hero, and how it was obtained.
    fn select_image(
        &self,
        request: &GenerationRequest,
        slug: &str,
        candidates: Vec<ImageCandidate>,
    ) -> (Vec<ImageCandidate>, Option<ImageCandidate>, ImageOutcome) {
        let mut finals: Vec<ImageCandidate> = Vec::new();
        for candidate in candidates {
            match to_canonical(&candidate.path, Quality::default()) {
                Ok(path) => match ImageCandidate::from_path(path) {
                    Ok(canonical) => finals.push(canonical),
                    Err(e) => {
                        warn!(error = %e, "could not stat normalized image, keeping original");
                        finals.push(candidate);
                    }
                },
                Err(e) => {
                    warn!(
                        path = %candidate.path.display(),
                        error = %e,
                        "normalization failed, keeping original format"
                    );
                    finals.push(candidate);
                }
            }
        }

        if let Some(first) = finals.first().cloned() {
            return (finals, Some(first), ImageOutcome::Provider);
        }

        match placeholder::render(&self.layout.image_dir(slug), slug, request) {
            Ok(candidate) => {
                info!(path = %candidate.path.display(), "placeholder hero rendered");
                (vec![candidate.clone()], Some(candidate), ImageOutcome::Placeholder)
            }
            Err(e) => {
                warn!(error = %e, "placeholder rendering failed, document will have no image");
                (Vec::new(), None, ImageOutcome::None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;

    struct FailingText;

    impl TextProvider for FailingText {
        fn name(&self) -> &str {
            "failing"
        }
        fn generate(&self, _: &GenerationRequest) -> Result<TextDraft, ProviderError> {
            Err(ProviderError::Empty)
        }
    }

    struct CannedText(&'static str);

    impl TextProvider for CannedText {
        fn name(&self) -> &str {
            "canned"
        }
        fn generate(&self, request: &GenerationRequest) -> Result<TextDraft, ProviderError> {
            Ok(TextDraft::from_body(&request.topic, self.0.to_string()))
        }
    }

    fn pipeline_with_text(providers: Vec<Box<dyn TextProvider>>) -> Pipeline {
        Pipeline::with_providers(providers, Vec::new(), OutputLayout::default())
    }

    #[test]
    fn first_text_success_wins() {
        let pipeline = pipeline_with_text(vec![
            Box::new(FailingText),
            Box::new(CannedText("# Desde el segundo\n\ncuerpo")),
            Box::new(CannedText("# Nunca llega\n")),
        ]);
        let draft = pipeline.generate_text(&GenerationRequest::new("tema"));
        assert_eq!(draft.title, "Desde el segundo");
    }

    #[test]
    fn exhausted_text_chain_uses_template() {
        let pipeline = pipeline_with_text(vec![Box::new(FailingText), Box::new(FailingText)]);
        let draft = pipeline.generate_text(&GenerationRequest::new("Mi Tema"));
        assert_eq!(draft.title, "Mi Tema");
        assert!(draft.body.contains("## Conclusión"));
    }

    #[test]
    fn empty_slug_aborts() {
        let pipeline = pipeline_with_text(Vec::new());
        let err = pipeline.run(&GenerationRequest::new("@#$%")).unwrap_err();
        assert!(matches!(err, PipelineError::EmptySlug));
    }
}
