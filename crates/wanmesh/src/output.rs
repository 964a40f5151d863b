//! Rendering of command results for `--output`.
//!
//! Tables go through `tabled`, json/yaml serialize the model types directly,
//! and `plain` prints bare names for piping into other tools.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use wanmesh_core::Role;

use crate::cli::{ColorMode, OutputFormat};

// ── Color ────────────────────────────────────────────────────────────

/// `auto` colors only an interactive stdout, and never when `NO_COLOR` is set.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Status and role styling, resolved once from `--color`.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(mode: &ColorMode) -> Self {
        Self {
            enabled: should_color(mode),
        }
    }

    fn paint(self, text: &str, style: impl FnOnce(&str) -> String) -> String {
        if self.enabled {
            style(text)
        } else {
            text.to_owned()
        }
    }

    pub fn ok(self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    pub fn warn(self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    pub fn heading(self, text: &str) -> String {
        self.paint(text, |t| t.bold().to_string())
    }

    pub fn role(self, role: Role) -> String {
        let text = role.to_string();
        match role {
            Role::Hub => self.paint(&text, |t| t.magenta().to_string()),
            Role::Branch => self.paint(&text, |t| t.cyan().to_string()),
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// Rows: `to_row` builds the table view, `name_of` the `plain` line.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    name_of: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    if let Some(text) = structured(format, data) {
        return text;
    }
    match format {
        OutputFormat::Plain => data.iter().map(name_of).collect::<Vec<_>>().join("\n"),
        _ => render_table(&data.iter().map(to_row).collect::<Vec<_>>()),
    }
}

/// One record: `detail` builds the human view shown for `table`.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail: impl Fn(&T) -> String,
    name_of: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
{
    if let Some(text) = structured(format, data) {
        return text;
    }
    match format {
        OutputFormat::Plain => name_of(data),
        _ => detail(data),
    }
}

/// Write to stdout unless `--quiet` or there is nothing to say.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{output}");
}

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// json/json-compact/yaml text, or `None` for the human formats.
///
/// Model types hold only strings, numbers, addresses and string-keyed maps,
/// so serialization cannot fail.
fn structured<T: Serialize + ?Sized>(format: &OutputFormat, data: &T) -> Option<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).expect("json encoding"),
        OutputFormat::JsonCompact => serde_json::to_string(data).expect("json encoding"),
        OutputFormat::Yaml => serde_yaml::to_string(data).expect("yaml encoding"),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(text)
}
