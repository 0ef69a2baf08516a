// ── Command API ──
//
// All interactive mutations can flow through a single `InterfaceCommand`
// enum. `execute` routes each variant to the matching collection
// operation. Deferred effects are left queued; the caller decides when to
// drain them.

use tracing::debug;

use crate::convert::{DeviceRecord, create_device};
use crate::error::CoreError;
use crate::model::Device;
use crate::store::InterfaceCollection;

/// Every write operation against an [`InterfaceCollection`].
#[derive(Debug, Clone)]
pub enum InterfaceCommand {
    Add(Device),
    Put(Device),
    /// A flat wire record, parsed before it is stored.
    PutObject(DeviceRecord),
    Remove {
        name: String,
    },
    Rename {
        from: String,
        to: String,
    },
    SetPrimary {
        name: Option<String>,
    },
}

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The named interface was inserted or replaced.
    Stored { name: String },
    Removed(Device),
    Renamed { from: String, to: String },
    PrimaryChanged { primary: Option<String> },
}

impl InterfaceCollection {
    /// Apply one command.
    pub fn execute(&mut self, command: InterfaceCommand) -> Result<CommandResult, CoreError> {
        debug!(?command, "executing interface command");

        match command {
            InterfaceCommand::Add(device) => {
                let name = device.name.clone();
                self.add(device)?;
                Ok(CommandResult::Stored { name })
            }
            InterfaceCommand::Put(device) => {
                let name = device.name.clone();
                self.put(device)?;
                Ok(CommandResult::Stored { name })
            }
            InterfaceCommand::PutObject(record) => {
                let device = create_device(&record)?;
                let name = device.name.clone();
                self.put(device)?;
                Ok(CommandResult::Stored { name })
            }
            InterfaceCommand::Remove { name } => self.remove(&name).map(CommandResult::Removed),
            InterfaceCommand::Rename { from, to } => {
                self.rename(&from, &to)?;
                Ok(CommandResult::Renamed { from, to })
            }
            InterfaceCommand::SetPrimary { name } => {
                self.set_primary_interface(name.as_deref())?;
                Ok(CommandResult::PrimaryChanged { primary: name })
            }
        }
    }
}
