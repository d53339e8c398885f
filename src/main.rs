mod parallel;
mod utils;

use clap::Parser;
use claude_chat_export::{ExportOptions, ExtractionMode, Format, ListStyle, Locale, Markers};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Export saved Claude conversation pages to JSON or Markdown.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Saved conversation page(s) (HTML).
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Output format: "json", "markdown" or "md".
    /// Defaults to json if not set in config.
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Directory to write exports into.
    /// Defaults to ./claude-chat-export if not set in config.
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/claude-chat-export/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Timestamp format and labels: "en-US" or "pt-BR".
    #[arg(long, value_name = "LOCALE")]
    locale: Option<Locale>,

    /// Take each message's text as-is instead of converting its structure.
    #[arg(long)]
    flat: bool,

    /// Use "- " instead of "• " for unordered list items.
    #[arg(long)]
    dash_bullets: bool,

    /// Stamp every message with the export time in JSON output.
    #[arg(long)]
    message_timestamps: bool,

    /// Print a summary of the first N messages instead of exporting.
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "3")]
    preview: Option<usize>,

    /// Write the export to stdout instead of a file.
    #[arg(long, conflicts_with = "preview")]
    stdout: bool,

    /// Log each container and file written.
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    format: Option<String>,
    target_dir: Option<PathBuf>,
    locale: Option<Locale>,
    list_style: Option<ListStyle>,
    flat: Option<bool>,
    message_timestamps: Option<bool>,
    user_label: Option<String>,
    assistant_label: Option<String>,
    markers: Option<Markers>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        dirs::config_dir()
            .map(|d| d.join("claude-chat-export/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) -> Result<()> {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| eyre!(e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve the format before touching any input, so a bad selector writes nothing
    let format: Format = cli
        .format
        .or(file_cfg.format)
        .unwrap_or_else(|| "json".to_string())
        .parse()?;

    // 3. Resolve target_dir (CLI > Config > Default)
    let target_dir = cli
        .out
        .or(file_cfg.target_dir)
        .unwrap_or_else(|| PathBuf::from("claude-chat-export"));

    // 4. Resolve extraction and rendering options (CLI flags > Config > Default)
    let flat = cli.flat || file_cfg.flat.unwrap_or(false);
    let list_style = if cli.dash_bullets {
        ListStyle::Dash
    } else {
        file_cfg.list_style.unwrap_or_default()
    };
    let options = ExportOptions {
        markers: file_cfg.markers.unwrap_or_default(),
        mode: if flat {
            ExtractionMode::Flat
        } else {
            ExtractionMode::Structured
        },
        message_timestamps: cli.message_timestamps || file_cfg.message_timestamps.unwrap_or(false),
        locale: cli.locale.or(file_cfg.locale).unwrap_or_default(),
        list_style,
        user_label: file_cfg.user_label,
        assistant_label: file_cfg.assistant_label,
    };

    // Fail on bad markers up front rather than once per page
    options.markers.compile()?;

    let output = match (cli.preview, cli.stdout) {
        (Some(n), _) => utils::Output::Preview(n),
        (None, true) => utils::Output::Stdout,
        (None, false) => utils::Output::Files,
    };

    // 5. Build the Export Config
    let config = utils::ExportConfig {
        inputs: cli.inputs,
        target_dir,
        format,
        options,
        output,
        quiet: cli.quiet,
    };

    // 6. Run the Business Logic
    let summary = parallel::execute(config)?;
    if summary.errors > 0 {
        return Err(eyre!("{} page(s) failed to export", summary.errors));
    }
    Ok(())
}
