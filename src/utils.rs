use chrono::Local;
use claude_chat_export::exporter::{export_filename, write_export};
use claude_chat_export::{ExportOptions, Format, Page, extract, renderer};
use eyre::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where a rendered page goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Files,
    Stdout,
    Preview(usize),
}

/// Configuration required to run the export process.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone)]
pub struct ExportConfig {
    pub inputs: Vec<PathBuf>,
    pub target_dir: PathBuf,
    pub format: Format,
    pub options: ExportOptions,
    pub output: Output,
    pub quiet: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    Written(PathBuf),
    Printed,
}

/// Read, extract, render and emit a single saved page.
///
/// Each page is stamped with the instant it is extracted.
pub fn process_page(input: &Path, config: &ExportConfig) -> Result<ProcessResult> {
    let html = fs::read_to_string(input)
        .wrap_err_with(|| format!("Failed to read page: {}", input.display()))?;
    let page = Page::parse(&html);
    let record = extract(&page, &config.options, Local::now().fixed_offset())?;

    match config.output {
        Output::Preview(n) => {
            let text = renderer::preview(&record, n, config.options.list_style);
            write_stdout(&text)?;
            Ok(ProcessResult::Printed)
        }
        Output::Stdout => {
            let text = config
                .format
                .render(&record, &config.options.render_context())?;
            write_stdout(&text)?;
            Ok(ProcessResult::Printed)
        }
        Output::Files => {
            let text = config
                .format
                .render(&record, &config.options.render_context())?;
            let filename = export_filename(&record.title, record.exported_at, config.format);
            let path = write_export(&config.target_dir, &filename, &text)
                .wrap_err_with(|| {
                    format!("Failed to write export into {}", config.target_dir.display())
                })?;
            Ok(ProcessResult::Written(path))
        }
    }
}

fn write_stdout(text: &str) -> Result<()> {
    fn write(text: &str) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()
    }
    write(text).wrap_err("Failed to write to stdout")
}
