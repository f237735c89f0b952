use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use postforge::config::{Credentials, GenerationRequest, OutputLayout};
use postforge::pipeline::{ImageOutcome, Pipeline};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "postforge")]
#[command(about = "Generate a blog article with a hero image, with provider fallback")]
#[command(long_about = "\
Generate a blog article with a hero image.

Text comes from the first configured text provider that answers (OpenAI,
then Gemini); images from the first configured image provider (KIE, then
Gemini, then OpenAI Images). With no credentials at all the run still
succeeds, using a local article template and a locally rendered placeholder
hero.

Credentials are read from OPENAI_API_KEY, GEMINI_API_KEY, and KIE_API_KEY.
A missing key just skips that provider.")]
#[command(version = version_string())]
struct Cli {
    /// Article topic
    #[arg(long)]
    topic: String,

    /// Visual style for the hero image
    #[arg(long, default_value = "fotográfico")]
    style: String,

    /// Accent color (azul, verde, rojo, amarillo, morado, rosa)
    #[arg(long, default_value = "azul")]
    accent: String,

    /// Key elements to work into the image prompt
    #[arg(long, default_value = "")]
    details: String,

    /// Frontmatter category
    #[arg(long)]
    category: Option<String>,

    /// Number of hero candidates to request
    #[arg(long, default_value_t = 1)]
    images: usize,

    /// Directory for article documents
    #[arg(long, default_value = "content/blog")]
    content_dir: PathBuf,

    /// Base directory for article images
    #[arg(long, default_value = "public/images/blog")]
    images_dir: PathBuf,

    /// Debug-level logging
    #[arg(long, short)]
    verbose: bool,
}

fn initialize_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let layout = OutputLayout::new(cli.content_dir, cli.images_dir);
    layout.bootstrap()?;

    let request = GenerationRequest {
        topic: cli.topic,
        style: cli.style,
        accent: cli.accent,
        details: cli.details,
        category: cli.category,
        image_count: cli.images.max(1),
    };

    let credentials = Credentials::from_env();
    let pipeline = Pipeline::new(&credentials, layout);
    let report = pipeline.run(&request)?;

    println!("Artículo guardado en: {}", report.document_path.display());
    match report.image_outcome {
        ImageOutcome::Provider => {
            for image in &report.images {
                println!("Imagen: {}", image.display());
            }
        }
        ImageOutcome::Placeholder => {
            for image in &report.images {
                println!("Imagen (placeholder): {}", image.display());
            }
        }
        ImageOutcome::None => {
            println!("Sin imagen: el artículo se generó sin referencia de imagen");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = initialize_logging(cli.verbose) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
