//! Push command handler.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{GlobalOpts, PushArgs};
use crate::config::{self, PushPolicy, PushSettings};
use crate::error::CliError;
use crate::output::{self, Painter};
use crate::push::{self, SshTransport};

use super::util;

/// The configured push host, or a usage error naming where to set it.
pub fn require_host(settings: &PushSettings) -> Result<String, CliError> {
    settings
        .host
        .clone()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| CliError::NoPushHost {
            path: config::config_path().display().to_string(),
        })
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Push `files` to `host` and turn the outcome into the command result.
pub fn push_and_report(
    files: &[PathBuf],
    host: &str,
    settings: &PushSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let painter = Painter::new(&global.color);
    let mut transport = SshTransport::new(host, settings);

    let progress = progress_bar(files.len(), global.quiet);
    let report = push::push_files(&mut transport, files, settings.on_error, &progress);
    progress.finish_and_clear();

    let mut lines: Vec<String> = report
        .pushed
        .iter()
        .map(|p| format!("{} {}", painter.ok("Pushed:"), push::file_label(p)))
        .collect();
    for failure in &report.failures {
        lines.push(format!(
            "{} {}: {}",
            painter.warn("Failed:"),
            push::file_label(&failure.file),
            failure.error
        ));
    }
    output::print_output(&lines.join("\n"), global.quiet);

    if report.is_success() {
        return Ok(());
    }

    let total = report.total();
    let failed: Vec<String> = report
        .failures
        .iter()
        .map(|f| push::file_label(&f.file))
        .collect();

    match (settings.on_error, report.failures.into_iter().next()) {
        (PushPolicy::Abort, Some(first)) => Err(CliError::Push {
            file: first.file.display().to_string(),
            source: first.error,
        }),
        _ => Err(CliError::PushIncomplete {
            failed: failed.len(),
            total,
            files: failed.join(", "),
        }),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: PushArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::resolve(global)?;
    let settings = config::resolve_push(cfg.push.clone(), &args.push_opts);

    let nothing = || CliError::NothingToPush {
        dir: cfg.output_dir.display().to_string(),
    };
    if !cfg.output_dir.is_dir() {
        return Err(nothing());
    }
    let files = push::generated_files(&cfg.output_dir).map_err(|source| CliError::Push {
        file: cfg.output_dir.display().to_string(),
        source,
    })?;
    if files.is_empty() {
        return Err(nothing());
    }

    let host = require_host(&settings)?;
    let prompt = format!("Push {} file(s) to {host}?", files.len());
    if !util::confirm(&prompt, global.yes)? {
        output::print_output("Push cancelled.", global.quiet);
        return Ok(());
    }

    push_and_report(&files, &host, &settings, global)
}
