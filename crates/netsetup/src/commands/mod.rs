//! Command dispatch: bridges CLI args -> session commands -> output formatting.

pub mod config_cmd;
pub mod interfaces;
pub mod summary;
pub mod util;

use netsetup_config::Config;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Painter};
use crate::state::Session;

/// Per-invocation settings resolved from flags and the config file.
pub struct Ctx<'a> {
    pub global: &'a GlobalOpts,
    pub format: OutputFormat,
    pub painter: Painter,
}

impl<'a> Ctx<'a> {
    pub fn new(global: &'a GlobalOpts, cfg: &Config) -> Self {
        Self {
            global,
            format: output::resolve_format(global, cfg),
            painter: Painter::new(output::resolve_color(global, cfg)),
        }
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Ctx::new(global, cfg);
    let mut session = Session::open(global, cfg)?;

    match cmd {
        Command::Interfaces(args) => interfaces::handle(&mut session, args, &ctx),
        Command::Summary => summary::handle(&session, &ctx),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
