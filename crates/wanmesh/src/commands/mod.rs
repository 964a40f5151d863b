//! Command dispatch: bridges CLI args -> core assembly -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod generate;
pub mod mesh;
pub mod push_cmd;
pub mod util;
pub mod validate;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a topology-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Generate(args) => generate::handle(args, global),
        Command::Mesh => mesh::handle(global),
        Command::Devices(args) => devices::handle(args, global),
        Command::Validate => validate::handle(global),
        Command::Push(args) => push_cmd::handle(args, global),
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}
