//! Local placeholder hero renderer.
//!
//! The last rung of the image fallback ladder: no network, no credential,
//! no font files. A 1920×1080 canvas gets a soft accent gradient, the topic
//! as word-wrapped uppercase text with a drop shadow, a derived subtitle,
//! and a small watermark, then is written straight to the canonical AVIF
//! format through the normalizer's encoder.

use std::io;
use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use thiserror::Error;

use super::allocate::unique_image_stem;
use super::glyphs::{glyph, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::normalize::{encode_avif, NormalizeError, Quality, CANONICAL_EXTENSION};
use super::ImageCandidate;
use crate::config::GenerationRequest;

const WIDTH: u32 = 1920;
const HEIGHT: u32 = 1080;
const BACKGROUND: Rgb<u8> = Rgb([0xf8, 0xfa, 0xfc]);
const TITLE_COLOR: Rgb<u8> = Rgb([0x1e, 0x29, 0x3b]);
const MUTED_COLOR: Rgb<u8> = Rgb([0x64, 0x74, 0x8b]);
const WATERMARK_COLOR: Rgb<u8> = Rgb([0x94, 0xa3, 0xb8]);
const WATERMARK: &str = "Imagen generada automáticamente";

const WRAP_WIDTH: usize = 30;
const LINE_HEIGHT: u32 = 80;
const TITLE_SCALE: u32 = 10;
const SUBTITLE_SCALE: u32 = 6;
const WATERMARK_SCALE: u32 = 4;
const EDGE_MARGIN: u32 = 20;

/// Named accent palette. Unknown names fall back to "azul".
const PALETTE: &[(&str, Rgb<u8>)] = &[
    ("azul", Rgb([0x25, 0x63, 0xeb])),
    ("verde", Rgb([0x05, 0x96, 0x69])),
    ("rojo", Rgb([0xdc, 0x26, 0x26])),
    ("amarillo", Rgb([0xd9, 0x77, 0x06])),
    ("morado", Rgb([0x7c, 0x3a, 0xed])),
    ("rosa", Rgb([0xdb, 0x27, 0x77])),
];

#[derive(Debug, Error)]
pub enum PlaceholderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Encode(#[from] NormalizeError),
}

/// Render the placeholder into `target_dir` using the shared allocation
/// scheme and return it as a validated-size candidate.
pub fn render(
    target_dir: &Path,
    slug: &str,
    request: &GenerationRequest,
) -> Result<ImageCandidate, PlaceholderError> {
    let stem = unique_image_stem(target_dir, slug, "hero")?;
    let path = stem.with_extension(CANONICAL_EXTENSION);

    let img = compose(request);
    encode_avif(&DynamicImage::ImageRgb8(img), &path, Quality::default())?;
    Ok(ImageCandidate::from_path(path)?)
}

fn accent_color(name: &str) -> Rgb<u8> {
    let wanted = name.trim().to_lowercase();
    PALETTE
        .iter()
        .find(|(key, _)| *key == wanted)
        .map(|(_, color)| *color)
        .unwrap_or(PALETTE[0].1)
}

fn compose(request: &GenerationRequest) -> RgbImage {
    let accent = accent_color(&request.accent);
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    // Accent fades from 10% opacity at the top to nothing at the bottom.
    for y in 0..HEIGHT {
        let alpha = (1.0 - y as f32 / HEIGHT as f32) * 0.1;
        let row_color = blend(BACKGROUND, accent, alpha);
        for x in 0..WIDTH {
            img.put_pixel(x, y, row_color);
        }
    }

    let title = request.topic.trim().to_uppercase();
    let lines = wrap(&title, WRAP_WIDTH);

    let block_height = lines.len() as u32 * LINE_HEIGHT;
    let mut y = (HEIGHT / 2).saturating_sub(block_height / 2 + LINE_HEIGHT);
    for line in &lines {
        let x = centered_x(line, TITLE_SCALE);
        draw_text(&mut img, line, x + 3, y + 3, TITLE_SCALE, MUTED_COLOR);
        draw_text(&mut img, line, x, y, TITLE_SCALE, TITLE_COLOR);
        y += LINE_HEIGHT;
    }

    let subtitle = format!("Artículo técnico • {}", request.style).to_uppercase();
    let x = centered_x(&subtitle, SUBTITLE_SCALE);
    draw_text(&mut img, &subtitle, x, y + LINE_HEIGHT / 2, SUBTITLE_SCALE, MUTED_COLOR);

    let watermark = WATERMARK.to_uppercase();
    let wx = WIDTH.saturating_sub(text_width(&watermark, WATERMARK_SCALE) + EDGE_MARGIN);
    let wy = HEIGHT.saturating_sub(GLYPH_HEIGHT * WATERMARK_SCALE + EDGE_MARGIN);
    draw_text(&mut img, &watermark, wx, wy, WATERMARK_SCALE, WATERMARK_COLOR);

    img
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, o: u8| (b as f32 * (1.0 - alpha) + o as f32 * alpha).round() as u8;
    Rgb([
        mix(base.0[0], over.0[0]),
        mix(base.0[1], over.0[1]),
        mix(base.0[2], over.0[2]),
    ])
}

/// Greedy word wrap at `max_chars` per line. Words longer than a line get a
/// line of their own.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    chars * (GLYPH_WIDTH + 1) * scale - scale
}

fn centered_x(text: &str, scale: u32) -> u32 {
    (WIDTH.saturating_sub(text_width(text, scale))) / 2
}

fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let mut cursor = x;
    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            draw_glyph(img, rows, cursor, y, scale, color);
        }
        cursor += (GLYPH_WIDTH + 1) * scale;
    }
}

fn draw_glyph(img: &mut RgbImage, rows: [u8; 7], x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    for (row_idx, row) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if row & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            let px = x + col * scale;
            let py = y + row_idx as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    let (fx, fy) = (px + dx, py + dy);
                    if fx < WIDTH && fy < HEIGHT {
                        img.put_pixel(fx, fy, color);
                    }
                }
            }
        }
    }
}
