//! Topic-to-slug normalization.
//!
//! The slug is the single key every component uses to locate an article's
//! document file and image directory. It is computed once per pipeline run
//! (by the orchestrator) and passed down — components never re-derive it
//! from the topic, so a topic like "Cámara IP" maps to exactly one
//! directory no matter which adapter produced the artifact.
//!
//! Normalization rules:
//! - ASCII letters are lowercased; digits pass through
//! - every other character (spaces, punctuation, accented letters) becomes
//!   a dash
//! - consecutive dashes collapse into one, leading/trailing dashes are
//!   stripped
//! - the result is capped at [`MAX_SLUG_LEN`] characters, truncating at the
//!   last dash before the limit so words are never cut in half

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 80;

/// Derive the slug for a topic.
///
/// Idempotent: `slugify(slugify(t)) == slugify(t)` for any input, because
/// the output alphabet (`a-z`, `0-9`, `-`) maps to itself and the result is
/// already collapsed, trimmed, and under the length cap.
pub fn slugify(topic: &str) -> String {
    let mapped: String = topic
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    // Collapse consecutive dashes
    let mut collapsed = String::with_capacity(mapped.len());
    let mut prev_dash = false;
    for c in mapped.chars() {
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }

    let trimmed = collapsed.trim_matches('-');

    // Truncate at word boundary (last dash before the limit)
    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes_spaces() {
        assert_eq!(
            slugify("Sistemas de videovigilancia inteligente"),
            "sistemas-de-videovigilancia-inteligente"
        );
    }

    #[test]
    fn digits_pass_through() {
        assert_eq!(slugify("Top 10 Consejos"), "top-10-consejos");
    }

    #[test]
    fn accented_characters_become_dashes() {
        assert_eq!(slugify("Cámara en Burgos"), "c-mara-en-burgos");
    }

    #[test]
    fn collapses_consecutive_dashes() {
        assert_eq!(slugify("foo -- bar"), "foo-bar");
        assert_eq!(slugify("a   b"), "a-b");
    }

    #[test]
    fn strips_leading_trailing_dashes() {
        assert_eq!(slugify("  hola  "), "hola");
        assert_eq!(slugify("¡Hola!"), "hola");
    }

    #[test]
    fn all_special_chars_yield_empty() {
        assert_eq!(slugify("@#$%"), "");
    }

    #[test]
    fn truncates_long_topics_at_word_boundary() {
        let topic = "palabra ".repeat(20); // 160 chars
        let slug = slugify(&topic);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("palabra-palabra"));
    }

    #[test]
    fn idempotent() {
        for topic in [
            "Sistemas de videovigilancia inteligente",
            "Cámara IP — guía 2025",
            &"muy-larga-".repeat(30),
        ] {
            let once = slugify(topic);
            assert_eq!(slugify(&once), once);
            assert!(once.len() <= MAX_SLUG_LEN);
        }
    }
}
