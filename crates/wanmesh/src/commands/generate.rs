//! Generate command handler: assemble, render, write, optionally push.

use wanmesh_core::OutputTarget;

use crate::cli::{GenerateArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};
use crate::render::{self, Renderer};

use super::{mesh, push_cmd, util};

pub fn handle(args: GenerateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::resolve(global)?;
    let assembly = util::assemble(&cfg.topology)?;
    let target = config::effective_target(global, assembly.topology.target());
    let painter = Painter::new(&global.color);

    // Render everything before writing anything.
    let renderer = Renderer::new(cfg.template_dir.as_deref())?;
    let files = renderer.render_all(target, &assembly.devices)?;

    if args.dry_run {
        let text = files
            .iter()
            .map(|f| format!("==> {} <==\n{}", f.file_name, f.contents))
            .collect::<Vec<_>>()
            .join("\n\n");
        output::print_output(&text, global.quiet);
        return Ok(());
    }

    if !args.no_summary {
        output::print_output(&mesh::summary(&assembly), global.quiet);
    }

    let written = render::write_files(&cfg.output_dir, &files)?;
    let generated: Vec<String> = written
        .iter()
        .map(|p| format!("{} {}", painter.ok("Generated:"), p.display()))
        .collect();
    output::print_output(
        &format!("\nBuilding configs with target: {target}\n{}", generated.join("\n")),
        global.quiet,
    );

    if !args.push {
        return Ok(());
    }
    if target == OutputTarget::Standalone {
        output::print_output(
            "Standalone configs generated. Push manually to each firewall.",
            global.quiet,
        );
        return Ok(());
    }

    let settings = config::resolve_push(cfg.push.clone(), &args.push_opts);
    let host = push_cmd::require_host(&settings)?;
    if !util::confirm(&format!("Push config to Panorama at {host}?"), global.yes)? {
        output::print_output("Push cancelled.", global.quiet);
        return Ok(());
    }

    push_cmd::push_and_report(&written, &host, &settings, global)
}
