// ── Bulk load and export ──
//
// Loading replays every record through `put` in a fixed order, exactly as
// if the user had entered them one by one, so a loaded state and an
// interactively built one end up identical.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::InterfaceCollection;
use crate::config::SessionConfig;
use crate::convert::{DeviceRecord, create_device};
use crate::error::CoreError;
use crate::model::Device;

/// Interface configuration as exchanged with the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceData {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub interfaces: IndexMap<String, DeviceRecord>,
}

impl InterfaceCollection {
    /// Replace the whole state with `data`.
    ///
    /// Records are applied by kind (Ethernet, VLAN, Bond, Bridge) and then
    /// by name, draining deferred effects after each one. A record without
    /// a name takes its dictionary key. On error nothing changes.
    pub fn set_data(&mut self, data: InterfaceData) -> Result<(), CoreError> {
        let mut devices = data
            .interfaces
            .into_iter()
            .map(|(key, record)| parse_entry(key, record))
            .collect::<Result<Vec<Device>, CoreError>>()?;
        devices.sort_by(|a, b| {
            a.interface_type()
                .load_rank()
                .cmp(&b.interface_type().load_rank())
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut fresh = Self::new(SessionConfig {
            physical_interfaces: self.physical.clone(),
        });
        for device in devices {
            fresh.put(device)?;
            fresh.run_pending_effects();
        }

        if let Some(primary) = data.primary {
            if fresh.contains(&primary) || fresh.is_physical(&primary) {
                fresh.primary = Some(primary);
            } else {
                warn!(interface = %primary, "ignoring unknown primary interface");
            }
        }

        debug!(interfaces = fresh.len(), "loaded interface data");
        self.devices = fresh.devices;
        self.engine = fresh.engine;
        self.primary = fresh.primary;
        self.commit_reset();
        Ok(())
    }

    /// Export every interface as a wire record, in collection order.
    ///
    /// Pending effects are not applied; drain them first to export the
    /// settled state.
    pub fn to_data(&self) -> InterfaceData {
        InterfaceData {
            primary: self.primary.clone(),
            interfaces: self
                .devices
                .iter()
                .map(|(name, device)| (name.clone(), device.to_object()))
                .collect(),
        }
    }
}

fn parse_entry(key: String, mut record: DeviceRecord) -> Result<Device, CoreError> {
    let named = ["name", "interface"].iter().any(|field| {
        record
            .get(*field)
            .and_then(Value::as_str)
            .is_some_and(|n| !n.is_empty())
    });
    if !named {
        record.remove("interface");
        record.insert("name".into(), Value::String(key));
    }
    create_device(&record)
}
