use crate::utils::{ExportConfig, Output, ProcessResult, process_page};
use crossbeam_channel::{SendTimeoutError, bounded};
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Counts of a finished run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub exported: usize,
    pub errors: usize,
}

pub fn execute(config: ExportConfig) -> Result<Summary> {
    let summary = if config.output == Output::Files && config.inputs.len() > 1 {
        run_pool(&config)?
    } else {
        run_sequential(&config)
    };

    if !config.quiet && config.output == Output::Files {
        eprintln!(
            "Done. {} exported. Errors: {}",
            summary.exported, summary.errors
        );
    }
    Ok(summary)
}

// ── Sequential path ───────────────────────────────────────────────────────────

fn run_sequential(config: &ExportConfig) -> Summary {
    let mut summary = Summary::default();
    for input in &config.inputs {
        match process_page(input, config) {
            Ok(result) => {
                report(&result);
                summary.exported += 1;
            }
            Err(e) => {
                summary.errors += 1;
                warn!("Error [{}]: {:#}", input.display(), e);
            }
        }
    }
    summary
}

// ── Worker pool ───────────────────────────────────────────────────────────────

fn run_pool(config: &ExportConfig) -> Result<Summary> {
    let (tx, rx) = bounded::<PathBuf>(32);
    let count_exported = AtomicUsize::new(0);
    let count_errors = AtomicUsize::new(0);
    let n_workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
        .min(config.inputs.len());

    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(config.inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .wrap_err("Invalid progress template")?
            .progress_chars("=>-"),
        );
        bar
    };

    std::thread::scope(|s| {
        for _ in 0..n_workers {
            let rx = rx.clone();
            let (config, count_exported, count_errors, pb) =
                (&config, &count_exported, &count_errors, &pb);

            s.spawn(move || {
                while let Ok(input) = rx.recv() {
                    match process_page(&input, config) {
                        Ok(result) => {
                            pb.suspend(|| report(&result));
                            count_exported.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            count_errors.fetch_add(1, Ordering::Relaxed);
                            pb.suspend(|| warn!("Error [{}]: {:#}", input.display(), e));
                        }
                    }
                    pb.inc(1);
                }
            });
        }

        drop(rx);

        'outer: for input in &config.inputs {
            let mut pending = input.clone();
            loop {
                match tx.send_timeout(pending, Duration::from_millis(50)) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Disconnected(_)) => break 'outer,
                    Err(SendTimeoutError::Timeout(r)) => {
                        pending = r;
                    }
                }
            }
        }

        drop(tx);
    });

    pb.finish_and_clear();

    Ok(Summary {
        exported: count_exported.load(Ordering::Relaxed),
        errors: count_errors.load(Ordering::Relaxed),
    })
}

fn report(result: &ProcessResult) {
    if let ProcessResult::Written(path) = result {
        info!("Exported to {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_chat_export::{ExportOptions, Format};
    use pretty_assertions::assert_eq;
    use std::fs;

    const PAGE: &str = r#"<html><body>
        <h1>Batch</h1>
        <div data-test-render-count="1"><div data-testid="user-message"><p>Hi</p></div></div>
        </body></html>"#;

    fn config(inputs: Vec<PathBuf>, target_dir: PathBuf) -> ExportConfig {
        ExportConfig {
            inputs,
            target_dir,
            format: Format::Json,
            options: ExportOptions::default(),
            output: Output::Files,
            quiet: true,
        }
    }

    #[test]
    fn batch_exports_every_page_and_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut inputs = Vec::new();
        for i in 0..4 {
            let path = dir.path().join(format!("page{}.html", i));
            fs::write(&path, PAGE).unwrap();
            inputs.push(path);
        }
        inputs.push(dir.path().join("missing.html"));

        let summary = execute(config(inputs, out.clone())).unwrap();
        assert_eq!(
            summary,
            Summary {
                exported: 4,
                errors: 1
            }
        );

        // Pages sharing a title may land in the same millisecond; none is clobbered.
        let mut names = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        assert_eq!(names.len(), 4);
        assert!(names.iter().all(|n| n.starts_with("Batch_") && n.ends_with(".json")));
    }

    #[test]
    fn single_page_runs_without_pool() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.html");
        fs::write(&input, PAGE).unwrap();

        let summary = execute(config(vec![input], dir.path().join("out"))).unwrap();
        assert_eq!(summary.exported, 1);
        assert_eq!(summary.errors, 0);
    }
}
