//! Validate command handler.

use serde::Serialize;

use wanmesh_core::Assembly;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

#[derive(Debug, Serialize)]
struct ValidationReport {
    topology: String,
    valid: bool,
    hubs: usize,
    branches: usize,
    tunnels: usize,
    devices: usize,
    warnings: Vec<String>,
}

impl ValidationReport {
    fn new(topology: String, assembly: &Assembly) -> Self {
        Self {
            topology,
            valid: true,
            hubs: assembly.topology.hubs().count(),
            branches: assembly.topology.spokes().count(),
            tunnels: assembly.mesh.len(),
            devices: assembly.devices.len(),
            warnings: assembly.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

fn detail(r: &ValidationReport, painter: Painter) -> String {
    let mut lines = vec![format!(
        "{} {}: {} hubs, {} branches, {} tunnels, {} devices",
        painter.ok("valid"),
        r.topology,
        r.hubs,
        r.branches,
        r.tunnels,
        r.devices
    )];
    for warning in &r.warnings {
        lines.push(format!("{} {warning}", painter.warn("warning:")));
    }
    lines.join("\n")
}

/// Structural errors surface as the command's error; warnings never fail it.
pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::resolve(global)?;
    let assembly = util::assemble(&cfg.topology)?;
    let painter = Painter::new(&global.color);

    let report = ValidationReport::new(cfg.topology.display().to_string(), &assembly);
    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, painter),
        |r| r.topology.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
