//! postforge — blog article generation with provider fallback.
//!
//! One run turns a topic into a Markdown document with frontmatter plus a
//! hero image. Text and images come from external providers tried in a
//! fixed order; when everything external fails, a local article template
//! and a locally rendered placeholder keep the run from ever producing
//! nothing.
//!
//! ## Module map
//!
//! | Module | Role |
//! |---|---|
//! | [`slug`] | Topic → slug normalization |
//! | [`config`] | Run inputs, provider credentials, output layout |
//! | [`article`] | Text drafts, title extraction, template fallback |
//! | [`imaging`] | Candidate validation, path allocation, AVIF normalization, placeholder |
//! | [`providers`] | Text and image adapter chains over the external APIs |
//! | [`document`] | Frontmatter block and document persistence |
//! | [`pipeline`] | The orchestrator tying the stages together |

pub mod article;
pub mod config;
pub mod document;
pub mod imaging;
pub mod pipeline;
pub mod providers;
pub mod slug;
