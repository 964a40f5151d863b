//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

fn format_config(cfg: &Config) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(cfg)?.trim_end().to_owned())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::default())?;
            output::print_output(
                &format!("Wrote default configuration to {}", written.display()),
                global.quiet,
            );
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let text = format_config(&cfg)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| text.clone(),
                |c| c.topology.display().to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
        }
    }
    Ok(())
}
