//! Collision-free image path allocation.
//!
//! Candidates are named `<slug>-<stem>-NNN` with a zero-padded sequence
//! starting at 1. A sequence number is free only when no file with that stem
//! exists under *any* accepted extension, so a `.png` candidate and its
//! later `.avif` normalization can never collide with a new allocation. The
//! caller appends the extension once the payload format is known.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions a provider payload may arrive in, plus the canonical one.
/// Collision probing checks all of them.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "avif"];

/// Reserve the next free stem under `base_dir`, creating the directory if
/// needed. Returns the extension-less path `base_dir/<slug>-<stem>-NNN`.
///
/// The reservation only becomes durable once the caller writes a file at
/// the stem; two interleaved runs on the same slug can race. That matches
/// the single-run-per-slug usage this tool is built for.
pub fn unique_image_stem(base_dir: &Path, slug: &str, stem: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(base_dir)?;
    let mut idx: u32 = 1;
    loop {
        let name = format!("{slug}-{stem}-{idx:03}");
        let candidate = base_dir.join(&name);
        let taken = ACCEPTED_EXTENSIONS
            .iter()
            .any(|ext| candidate.with_extension(ext).exists());
        if !taken {
            return Ok(candidate);
        }
        idx += 1;
    }
}
