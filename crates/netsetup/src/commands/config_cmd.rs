//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};

use netsetup_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

const OUTPUT_CHOICES: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];

fn format_config(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out);
    let _ = writeln!(out, "[hardware]");
    let names: Vec<String> = cfg
        .hardware
        .physical_interfaces
        .iter()
        .map(|n| format!("\"{n}\""))
        .collect();
    let _ = writeln!(out, "physical_interfaces = [{}]", names.join(", "));
    if let Some(ref state) = cfg.session.state_file {
        let _ = writeln!(out);
        let _ = writeln!(out, "[session]");
        let _ = write!(out, "state_file = \"{}\"", state.display());
    }
    out.trim_end().to_owned()
}

/// Ask for the hardware list and output default.
fn prompt_config(mut cfg: Config) -> Result<Config, CliError> {
    let physical: String = Input::new()
        .with_prompt("Hardware interfaces (comma separated)")
        .with_initial_text(cfg.hardware.physical_interfaces.join(","))
        .allow_empty(true)
        .interact_text()?;
    cfg.hardware.physical_interfaces = physical
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .collect();

    let current = OUTPUT_CHOICES
        .iter()
        .position(|c| *c == cfg.defaults.output)
        .unwrap_or_default();
    let selection = Select::new()
        .with_prompt("Default output format")
        .items(OUTPUT_CHOICES)
        .default(current)
        .interact()?;
    if let Some(choice) = OUTPUT_CHOICES.get(selection) {
        cfg.defaults.output = (*choice).to_owned();
    }
    Ok(cfg)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let format = output::resolve_format(global, &cfg);
            let out = match format {
                OutputFormat::Table | OutputFormat::Plain => format_config(&cfg),
                _ => output::render_single(format, &cfg, format_config, format_config)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists()
                && !force
                && !util::confirm(
                    "config init",
                    &format!("Overwrite {}?", path.display()),
                    global.yes,
                )?
            {
                output::print_output("Aborted.", global.quiet);
                return Ok(());
            }

            let mut cfg = Config::default();
            if let Some(physical) = &global.physical {
                cfg.hardware.physical_interfaces.clone_from(physical);
            }
            if let Some(state) = &global.state {
                cfg.session.state_file = Some(state.clone());
            }
            if !global.yes && util::interactive() {
                cfg = prompt_config(cfg)?;
            }

            let written = config::save_config(&cfg)?;
            output::print_output(
                &format!("Wrote {}", written.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
