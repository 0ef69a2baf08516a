//! Summary command handler.

use netsetup_core::NetworkSummary;

use crate::error::CliError;
use crate::output::{self, Painter};
use crate::state::Session;

use super::Ctx;

/// Section headings in bold, everything else as the core renders it.
fn detail(summary: &NetworkSummary, painter: Painter) -> String {
    summary
        .to_string()
        .lines()
        .map(|line| {
            if line.starts_with(' ') {
                line.to_owned()
            } else if let Some((label, rest)) = line.split_once(": ") {
                format!("{} {rest}", painter.label(&format!("{label}:")))
            } else {
                painter.label(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn handle(session: &Session, ctx: &Ctx<'_>) -> Result<(), CliError> {
    let summary = session.interfaces.summary();
    let out = output::render_single(
        ctx.format,
        &summary,
        |s| detail(s, ctx.painter),
        ToString::to_string,
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
