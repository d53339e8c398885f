use crate::assembler::ConversationRecord;
use crate::error::{ExportError, Result};
use crate::renderer::{RenderContext, render_json, render_markdown};
use chrono::{DateTime, FixedOffset};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::debug;

const FALLBACK_STEM: &str = "claude_chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Markdown => "md",
        }
    }

    pub fn render(self, record: &ConversationRecord, ctx: &RenderContext) -> Result<String> {
        match self {
            Format::Json => render_json(record, ctx),
            Format::Markdown => Ok(render_markdown(record, ctx)),
        }
    }
}

impl FromStr for Format {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "markdown" | "md" => Ok(Format::Markdown),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_`, one for one.
pub fn sanitize_title(title: &str) -> String {
    if title.is_empty() {
        return FALLBACK_STEM.to_string();
    }
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `<sanitized title>_<unix millis>.<ext>`
pub fn export_filename(title: &str, at: DateTime<FixedOffset>, format: Format) -> String {
    format!(
        "{}_{}.{}",
        sanitize_title(title),
        at.timestamp_millis(),
        format.extension()
    )
}

/// Atomically write `contents` to `<dir>/<filename>`.
///
/// The data goes to a temporary file in `dir` first and is only renamed into place
/// once fully written; the temporary file is removed on every failure path. An
/// existing file is never overwritten: `<stem>_2.<ext>`, `<stem>_3.<ext>`, ... are
/// tried instead until a free name turns up.
pub fn write_export(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };

    let mut path = dir.join(filename);
    let mut attempt = 1usize;
    loop {
        match tmp.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "export name taken, trying next");
                tmp = e.file;
            }
            Err(e) => return Err(e.error.into()),
        }
        attempt += 1;
        let name = match ext {
            Some(ext) => format!("{}_{}.{}", stem, attempt, ext),
            None => format!("{}_{}", stem, attempt),
        };
        path = dir.join(name);
    }
}
