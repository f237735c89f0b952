//! Canonical-format normalization.
//!
//! Every selected hero ends up as AVIF regardless of what the provider
//! returned. Decoding uses the `image` crate's pure-Rust decoders; encoding
//! uses `AvifEncoder` (rav1e). AVIF input is already canonical and is
//! returned untouched, which also means the pipeline never needs an AVIF
//! *decoder*.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::avif::AvifEncoder;
use image::{DynamicImage, ImageReader};
use thiserror::Error;
use tracing::warn;

use super::extension_of;

/// Extension of the canonical on-disk format.
pub const CANONICAL_EXTENSION: &str = "avif";

/// rav1e speed setting. 6 trades encode time against size about the same
/// way the usual "method 6" lossy-web settings do.
const ENCODE_SPEED: u8 = 6;

/// Encoder quality, clamped to 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("AVIF encode failed for {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

/// Re-encode `source` as canonical AVIF next to it, deleting `source` on
/// success. Returns the canonical path.
///
/// - AVIF input is a no-op: the source path comes back unchanged.
/// - On decode or encode failure the source file is left exactly as it was,
///   so the caller can still use the validated original.
/// - A failed deletion of the source after a successful encode is logged
///   and ignored; the canonical file is already in place.
pub fn to_canonical(source: &Path, quality: Quality) -> Result<PathBuf, NormalizeError> {
    if extension_of(source).as_deref() == Some(CANONICAL_EXTENSION) {
        return Ok(source.to_path_buf());
    }

    let img = ImageReader::open(source)?
        .decode()
        .map_err(|e| NormalizeError::Decode {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

    let target = source.with_extension(CANONICAL_EXTENSION);
    encode_avif(&img, &target, quality)?;

    if let Err(e) = fs::remove_file(source) {
        warn!(source = %source.display(), error = %e, "could not remove pre-normalization file");
    }
    Ok(target)
}

/// Encode a decoded image to `target` as AVIF. Shared with the placeholder
/// renderer, which synthesizes its pixels instead of decoding them.
pub(crate) fn encode_avif(
    img: &DynamicImage,
    target: &Path,
    quality: Quality,
) -> Result<(), NormalizeError> {
    let file = fs::File::create(target)?;
    let writer = BufWriter::new(file);
    let encoder = AvifEncoder::new_with_speed_quality(writer, ENCODE_SPEED, quality.value());
    img.write_with_encoder(encoder)
        .map_err(|e| NormalizeError::Encode {
            path: target.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn write_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128u8])
        });
        let file = fs::File::create(path).unwrap();
        let mut encoder = JpegEncoder::new_with_quality(file, 90);
        encoder.encode_image(&img).unwrap();
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(85).value(), 85);
        assert_eq!(Quality::new(200).value(), 100);
        assert_eq!(Quality::default().value(), 85);
    }

    #[test]
    fn jpeg_becomes_avif_and_source_is_removed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("hero-001.jpg");
        write_test_jpeg(&source, 64, 48);

        let canonical = to_canonical(&source, Quality::default()).unwrap();
        assert_eq!(canonical, tmp.path().join("hero-001.avif"));
        assert!(canonical.exists());
        assert!(!source.exists());
        assert!(fs::metadata(&canonical).unwrap().len() > 0);
    }

    #[test]
    fn avif_input_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("hero-001.avif");
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(32, 32, Rgb([10, 20, 30])));
        encode_avif(&img, &source, Quality::default()).unwrap();
        let before = fs::metadata(&source).unwrap().len();

        let canonical = to_canonical(&source, Quality::default()).unwrap();
        assert_eq!(canonical, source);
        assert!(source.exists());
        assert_eq!(fs::metadata(&source).unwrap().len(), before);
    }

    #[test]
    fn undecodable_source_is_preserved() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("hero-001.png");
        fs::write(&source, b"not an image at all").unwrap();

        let err = to_canonical(&source, Quality::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode { .. }));
        assert!(source.exists());
        assert_eq!(fs::read(&source).unwrap(), b"not an image at all");
        assert!(!tmp.path().join("hero-001.avif").exists());
    }
}
