//! Document assembly: the frontmatter metadata block and body persistence.
//!
//! The metadata block is `---` delimited `key: value` lines in a fixed
//! order (title, description, date, slug, category, image), followed by a
//! blank line and the Markdown body. Free-text values are single-quoted;
//! the image line is omitted entirely when no image survived the pipeline,
//! so a document never references a file that does not exist.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Local;

/// Metadata for one article document.
#[derive(Debug, Clone)]
pub struct Frontmatter {
    pub title: String,
    pub description: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub slug: String,
    pub category: String,
    /// Web-relative hero path, when one exists on disk.
    pub image: Option<String>,
}

impl Frontmatter {
    /// Standard metadata for a generated article: today's date and the
    /// derived description.
    pub fn new(title: &str, slug: &str, category: Option<&str>, image: Option<String>) -> Self {
        Self {
            title: title.to_string(),
            description: format!("{title} — artículo técnico"),
            date: Local::now().format("%Y-%m-%d").to_string(),
            slug: slug.to_string(),
            category: category.unwrap_or("General").to_string(),
            image,
        }
    }

    /// Render the full document: metadata block, blank line, body.
    pub fn render(&self, body: &str) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("title: {}\n", quote(&self.title)));
        out.push_str(&format!("description: {}\n", quote(&self.description)));
        out.push_str(&format!("date: {}\n", quote(&self.date)));
        out.push_str(&format!("slug: {}\n", self.slug));
        out.push_str(&format!("category: {}\n", quote(&self.category)));
        if let Some(image) = &self.image {
            out.push_str(&format!("image: {image}\n"));
        }
        out.push_str("---\n\n");
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Single-quoted YAML scalar; embedded quotes are doubled. Applied to every
/// free-text value; the slug's alphabet needs no quoting.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render and write the document.
pub fn write_document(path: &Path, frontmatter: &Frontmatter, body: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, frontmatter.render(body))
}
