// ── Configuration rendering ──
//
// Turns assembled device models into PAN-OS set-command files. Templates are
// built in; a configured template directory may replace either one. Every
// device is rendered in memory before anything touches the disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use tracing::{debug, info};

use wanmesh_core::{DeviceModel, OutputTarget};

use crate::error::CliError;

pub const SET_TEMPLATE: &str = "pa-set.tera";
pub const STANDALONE_TEMPLATE: &str = "pa-standalone.tera";

/// Aggregated output file for Panorama mode.
pub const PANORAMA_FILE: &str = "panorama-set.txt";

const BUILTIN_SET: &str = include_str!("../templates/pa-set.tera");
const BUILTIN_STANDALONE: &str = include_str!("../templates/pa-standalone.tera");

/// One output file, rendered but not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub file_name: String,
    pub contents: String,
}

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load the built-in templates, replacing any that exist in `template_dir`.
    pub fn new(template_dir: Option<&Path>) -> Result<Self, CliError> {
        let mut tera = Tera::default();

        for (name, builtin) in [
            (SET_TEMPLATE, BUILTIN_SET),
            (STANDALONE_TEMPLATE, BUILTIN_STANDALONE),
        ] {
            let override_path = template_dir.map(|dir| dir.join(name)).filter(|p| p.is_file());
            let source = match override_path {
                Some(path) => {
                    debug!(template = name, path = %path.display(), "using template override");
                    std::fs::read_to_string(&path)?
                }
                None => builtin.to_owned(),
            };
            tera.add_raw_template(name, &source)
                .map_err(|source| CliError::Template {
                    name: name.into(),
                    source,
                })?;
        }

        Ok(Self { tera })
    }

    /// Render one device with the template for `target`.
    pub fn render_device(
        &self,
        target: OutputTarget,
        device: &DeviceModel,
    ) -> Result<String, CliError> {
        let template = match target {
            OutputTarget::Panorama => SET_TEMPLATE,
            OutputTarget::Standalone => STANDALONE_TEMPLATE,
        };

        let mut context = Context::new();
        context.insert("vars", device);
        self.tera
            .render(template, &context)
            .map_err(|source| CliError::Render {
                device: device.name.clone(),
                source,
            })
    }

    /// Render every device into the files `target` calls for.
    ///
    /// Panorama mode yields one aggregated file with a delimiter line before
    /// each device; standalone mode yields one file per device.
    pub fn render_all(
        &self,
        target: OutputTarget,
        devices: &BTreeMap<String, DeviceModel>,
    ) -> Result<Vec<RenderedFile>, CliError> {
        let mut rendered = Vec::with_capacity(devices.len());
        for (name, device) in devices {
            rendered.push((name, self.render_device(target, device)?));
        }

        let files = match target {
            OutputTarget::Panorama => vec![RenderedFile {
                file_name: PANORAMA_FILE.into(),
                contents: rendered
                    .iter()
                    .map(|(name, text)| format!("# ===== Configuration for {name} =====\n{text}"))
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            }],
            OutputTarget::Standalone => rendered
                .into_iter()
                .map(|(name, contents)| RenderedFile {
                    file_name: format!("{name}.txt"),
                    contents,
                })
                .collect(),
        };
        Ok(files)
    }
}

/// Write rendered files into `dir`, creating it if needed.
pub fn write_files(dir: &Path, files: &[RenderedFile]) -> Result<Vec<PathBuf>, CliError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.file_name);
        std::fs::write(&path, &file.contents)?;
        info!(path = %path.display(), bytes = file.contents.len(), "wrote configuration");
        written.push(path);
    }
    Ok(written)
}
