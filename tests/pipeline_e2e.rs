//! End-to-end pipeline runs against stub providers in a temp directory.

use std::fs;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ImageBuffer, ImageEncoder, Rgb};
use tempfile::TempDir;

use postforge::article::TextDraft;
use postforge::config::{Credentials, GenerationRequest, OutputLayout};
use postforge::imaging::ImageCandidate;
use postforge::pipeline::{ImageOutcome, Pipeline};
use postforge::providers::{
    ImageProvider, ImageRequest, ProviderError, TextProvider,
};

struct StubText {
    body: &'static str,
}

impl TextProvider for StubText {
    fn name(&self) -> &str {
        "stub-text"
    }
    fn generate(&self, request: &GenerationRequest) -> Result<TextDraft, ProviderError> {
        Ok(TextDraft::from_body(&request.topic, self.body.to_string()))
    }
}

struct FailingText;

impl TextProvider for FailingText {
    fn name(&self) -> &str {
        "failing-text"
    }
    fn generate(&self, _: &GenerationRequest) -> Result<TextDraft, ProviderError> {
        Err(ProviderError::Api {
            status: 500,
            body: "internal".to_string(),
        })
    }
}

/// Writes one real PNG per request, like a well-behaved provider.
struct StubImage;

impl ImageProvider for StubImage {
    fn name(&self) -> &str {
        "stub-image"
    }
    fn generate(&self, request: &ImageRequest<'_>) -> Result<Vec<ImageCandidate>, ProviderError> {
        fs::create_dir_all(request.target_dir)?;
        let path = request
            .target_dir
            .join(format!("{}-hero-001.png", request.slug));
        write_real_png(&path, 320, 180);
        Ok(vec![ImageCandidate::from_path(path)?])
    }
}

/// Returns a candidate that is too small to be a real image.
struct TinyImage;

impl ImageProvider for TinyImage {
    fn name(&self) -> &str {
        "tiny-image"
    }
    fn generate(&self, request: &ImageRequest<'_>) -> Result<Vec<ImageCandidate>, ProviderError> {
        fs::create_dir_all(request.target_dir)?;
        let path = request
            .target_dir
            .join(format!("{}-hero-001.png", request.slug));
        fs::write(&path, vec![0u8; 500])?;
        Ok(vec![ImageCandidate::from_path(path)?])
    }
}

fn write_real_png(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 90u8])
    });
    let file = fs::File::create(path).unwrap();
    PngEncoder::new(file)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

fn temp_layout(tmp: &TempDir) -> OutputLayout {
    OutputLayout::new(tmp.path().join("content"), tmp.path().join("images"))
}

#[test]
fn no_credentials_still_produces_document_and_placeholder() {
    let tmp = TempDir::new().unwrap();
    let layout = temp_layout(&tmp);
    let pipeline = Pipeline::new(&Credentials::none(), layout.clone());

    let request = GenerationRequest::new("Videovigilancia para comercios");
    let report = pipeline.run(&request).unwrap();

    assert_eq!(report.slug, "videovigilancia-para-comercios");
    assert_eq!(report.image_outcome, ImageOutcome::Placeholder);

    let document = fs::read_to_string(&report.document_path).unwrap();
    assert!(document.contains("## Introducción"));
    assert!(document.contains("## Conclusión"));
    assert!(document.contains(
        "image: /images/blog/videovigilancia-para-comercios/videovigilancia-para-comercios-hero-001.avif"
    ));

    let hero = layout
        .image_dir(&report.slug)
        .join("videovigilancia-para-comercios-hero-001.avif");
    assert!(hero.exists());
    assert!(fs::metadata(&hero).unwrap().len() >= 1000);
}

#[test]
fn stub_text_success_sets_title_from_first_heading() {
    let tmp = TempDir::new().unwrap();
    let pipeline = Pipeline::with_providers(
        vec![
            Box::new(FailingText),
            Box::new(StubText {
                body: "Intro.\n\n# Título Personalizado\n\nCuerpo del artículo.\n",
            }),
        ],
        Vec::new(),
        temp_layout(&tmp),
    );

    let report = pipeline.run(&GenerationRequest::new("Mi Tema")).unwrap();
    assert_eq!(report.title, "Título Personalizado");

    let document = fs::read_to_string(&report.document_path).unwrap();
    assert!(document.contains("title: 'Título Personalizado'"));
    assert!(document.contains("Cuerpo del artículo."));
}

#[test]
fn valid_provider_image_is_normalized_and_referenced() {
    let tmp = TempDir::new().unwrap();
    let layout = temp_layout(&tmp);
    let pipeline = Pipeline::with_providers(
        Vec::new(),
        vec![Box::new(StubImage)],
        layout.clone(),
    );

    let report = pipeline.run(&GenerationRequest::new("Tema con imagen")).unwrap();
    assert_eq!(report.image_outcome, ImageOutcome::Provider);

    let image_dir = layout.image_dir(&report.slug);
    let canonical = image_dir.join("tema-con-imagen-hero-001.avif");
    assert!(canonical.exists());
    assert!(!image_dir.join("tema-con-imagen-hero-001.png").exists());

    let document = fs::read_to_string(&report.document_path).unwrap();
    assert!(document.contains("image: /images/blog/tema-con-imagen/tema-con-imagen-hero-001.avif"));
}

#[test]
fn undersized_candidate_is_discarded_and_never_referenced() {
    let tmp = TempDir::new().unwrap();
    let layout = temp_layout(&tmp);
    let pipeline = Pipeline::with_providers(
        Vec::new(),
        vec![Box::new(TinyImage)],
        layout.clone(),
    );

    let report = pipeline.run(&GenerationRequest::new("Tema fallido")).unwrap();
    assert_eq!(report.image_outcome, ImageOutcome::Placeholder);

    let document = fs::read_to_string(&report.document_path).unwrap();
    // The tiny candidate occupies sequence 001, so the placeholder lands on 002.
    assert!(document.contains("image: /images/blog/tema-fallido/tema-fallido-hero-002.avif"));
    assert!(!document.contains("hero-001"));

    let placeholder = layout.image_dir(&report.slug).join("tema-fallido-hero-002.avif");
    assert!(fs::metadata(&placeholder).unwrap().len() >= 1000);
}

#[test]
fn repeated_runs_advance_the_sequence_number() {
    let tmp = TempDir::new().unwrap();
    let layout = temp_layout(&tmp);
    let pipeline = Pipeline::with_providers(Vec::new(), Vec::new(), layout.clone());

    let request = GenerationRequest::new("Mismo Tema");
    let first = pipeline.run(&request).unwrap();
    let second = pipeline.run(&request).unwrap();

    assert_eq!(first.images.len(), 1);
    assert_eq!(second.images.len(), 1);
    let first_name = first.images[0].file_name().unwrap().to_string_lossy().into_owned();
    let second_name = second.images[0].file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(first_name, "mismo-tema-hero-001.avif");
    assert_eq!(second_name, "mismo-tema-hero-002.avif");

    // Both files exist; the second run overwrote only the document.
    assert!(layout.image_dir(&first.slug).join(&first_name).exists());
    assert!(layout.image_dir(&second.slug).join(&second_name).exists());
    let document = fs::read_to_string(&second.document_path).unwrap();
    assert!(document.contains(&second_name));
}
