//! # claude-chat-export
//!
//! Converts a saved Claude conversation page into portable exports: a structured
//! JSON record or a flattened Markdown document.
//!
//! ## What it does
//!
//! A rendered conversation page is a tree of turn containers. Each container is
//! classified as a user turn or an assistant turn by structural markers, and its
//! content region is converted into a small set of semantic blocks (paragraphs,
//! headings, lists, code blocks, quotes, plain text). The ordered messages are then
//! rendered to JSON or Markdown.
//!
//! The page is parsed once into a read-only snapshot; nothing is fetched, and a
//! page with no recognizable turns still produces a well-formed, empty export.
//!
//! ## Usage
//!
//! ```sh
//! # Markdown export of a saved page into ./claude-chat-export
//! claude-chat-export conversation.html --format markdown
//!
//! # JSON to stdout, Portuguese labels
//! claude-chat-export conversation.html --stdout --locale pt-BR
//!
//! # Quick look at the first three messages
//! claude-chat-export conversation.html --preview
//! ```
//!
//! Preferences, including the page markers, can be persisted in
//! `~/.config/claude-chat-export/config.toml`.
pub mod assembler;
pub mod block;
pub mod classifier;
pub mod converter;
pub mod error;
pub mod exporter;
pub mod page;
pub mod renderer;

pub use assembler::{AssembleOptions, ConversationRecord, Message, Role, assemble};
pub use block::{Block, ListStyle};
pub use classifier::Markers;
pub use converter::ExtractionMode;
pub use error::{ExportError, Result};
pub use exporter::Format;
pub use page::Page;
pub use renderer::{Locale, RenderContext};

use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use tracing::info;

/// Settings shared by extraction and rendering.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub markers: Markers,
    pub mode: ExtractionMode,
    pub message_timestamps: bool,
    pub locale: Locale,
    pub list_style: ListStyle,
    pub user_label: Option<String>,
    pub assistant_label: Option<String>,
}

impl ExportOptions {
    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            locale: self.locale,
            list_style: self.list_style,
            user_label: self.user_label.clone(),
            assistant_label: self.assistant_label.clone(),
        }
    }

    fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            mode: self.mode,
            message_timestamps: self.message_timestamps,
        }
    }
}

/// Extract the conversation record from a page.
pub fn extract(
    page: &Page,
    options: &ExportOptions,
    now: DateTime<FixedOffset>,
) -> Result<ConversationRecord> {
    let markers = options.markers.compile()?;
    Ok(assemble(page, &markers, options.assemble_options(), now))
}

pub fn render_json(page: &Page, options: &ExportOptions, now: DateTime<FixedOffset>) -> Result<String> {
    let record = extract(page, options, now)?;
    renderer::render_json(&record, &options.render_context())
}

pub fn render_markdown(
    page: &Page,
    options: &ExportOptions,
    now: DateTime<FixedOffset>,
) -> Result<String> {
    let record = extract(page, options, now)?;
    Ok(renderer::render_markdown(&record, &options.render_context()))
}

/// Summary of the first `n` messages (three by default).
pub fn preview(
    page: &Page,
    options: &ExportOptions,
    n: Option<usize>,
    now: DateTime<FixedOffset>,
) -> Result<String> {
    let record = extract(page, options, now)?;
    Ok(renderer::preview(
        &record,
        n.unwrap_or(renderer::DEFAULT_PREVIEW_MESSAGES),
        options.list_style,
    ))
}

/// Extract, render in the selected format and write the file into `dir`.
///
/// The format selector is checked before anything else, so an unsupported one
/// never produces a file.
pub fn export(
    page: &Page,
    options: &ExportOptions,
    format: &str,
    dir: &Path,
    now: DateTime<FixedOffset>,
) -> Result<PathBuf> {
    let format: Format = format.parse()?;
    let record = extract(page, options, now)?;
    let contents = format.render(&record, &options.render_context())?;
    let filename = exporter::export_filename(&record.title, record.exported_at, format);
    let path = exporter::write_export(dir, &filename, &contents)?;
    info!(path = %path.display(), messages = record.messages.len(), "Exported to {}", path.display());
    Ok(path)
}
