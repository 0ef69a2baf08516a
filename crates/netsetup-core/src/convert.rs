// ── Wire record conversion ──
//
// The server hands interfaces around as flat property objects. This module
// maps them to and from the typed `Device`. Missing fields take the kind's
// defaults (empty lists, `false`, `null`) so repeated round trips are stable;
// unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::error::CoreError;
use crate::model::{
    BondConfig, BondMode, BridgeConfig, Device, DeviceKind, InterfaceType, Ip4Address,
    Ip6Address, VlanConfig,
};

/// A flat property object as exchanged with the server.
pub type DeviceRecord = Map<String, Value>;

/// Lenient view of a record: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    name: Option<String>,
    /// Older records carry the name here; `name` wins when both are set.
    interface: Option<String>,
    #[serde(rename = "interfaceType")]
    interface_type: Option<String>,
    ip4: Vec<Ip4Address>,
    ip6: Vec<Ip6Address>,
    ip4dynamic: Option<bool>,
    ip6dynamic: Option<bool>,
    options: Vec<String>,
    start: Option<bool>,

    vlan_id: Option<u16>,
    parent_device: Option<String>,

    bond_slaves: Vec<String>,
    bond_primary: Vec<String>,
    bond_mode: Option<u8>,
    bond_miimon: Option<u32>,

    bridge_ports: Vec<String>,
    bridge_fd: Option<u32>,
}

/// Build a typed device from a property object, dispatching on
/// `interfaceType`.
pub fn create_device(record: &DeviceRecord) -> Result<Device, CoreError> {
    let raw: RawRecord = serde_json::from_value(Value::Object(record.clone())).map_err(|e| {
        CoreError::MalformedRecord {
            name: record
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            message: e.to_string(),
        }
    })?;

    let tag = raw.interface_type.unwrap_or_default();
    let interface_type: InterfaceType = tag
        .parse()
        .map_err(|_| CoreError::UnknownInterfaceType { value: tag.clone() })?;

    let kind = match interface_type {
        InterfaceType::Ethernet => DeviceKind::Ethernet,
        InterfaceType::Vlan => DeviceKind::Vlan(VlanConfig {
            vlan_id: raw.vlan_id,
            parent_device: raw.parent_device,
        }),
        InterfaceType::Bond => DeviceKind::Bond(BondConfig {
            slaves: raw.bond_slaves,
            primary: raw.bond_primary,
            mode: raw.bond_mode.map(BondMode::try_from).transpose()?,
            miimon: raw.bond_miimon,
        }),
        InterfaceType::Bridge => DeviceKind::Bridge(BridgeConfig {
            ports: raw.bridge_ports,
            forward_delay: raw.bridge_fd.unwrap_or_default(),
        }),
    };

    let name = raw
        .name
        .filter(|n| !n.is_empty())
        .or(raw.interface)
        .unwrap_or_default();

    Ok(Device {
        name,
        ip4: raw.ip4,
        ip6: raw.ip6,
        ip4dynamic: raw.ip4dynamic.unwrap_or_default(),
        ip6dynamic: raw.ip6dynamic.unwrap_or_default(),
        options: raw.options,
        start: raw.start.unwrap_or_default(),
        kind,
    })
}

impl Device {
    /// Parse a property object. Alias of [`create_device`].
    pub fn from_object(record: &DeviceRecord) -> Result<Self, CoreError> {
        create_device(record)
    }

    /// Flatten into the property object the server expects.
    ///
    /// Every field of the device's kind is present, including defaults.
    pub fn to_object(&self) -> DeviceRecord {
        let mut obj = Map::new();
        obj.insert("name".into(), json!(self.name));
        obj.insert("interfaceType".into(), json!(self.interface_type().to_string()));
        obj.insert("ip4".into(), json!(self.ip4));
        obj.insert("ip6".into(), json!(self.ip6));
        obj.insert("ip4dynamic".into(), json!(self.ip4dynamic));
        obj.insert("ip6dynamic".into(), json!(self.ip6dynamic));
        obj.insert("options".into(), json!(self.options));
        obj.insert("start".into(), json!(self.start));

        match &self.kind {
            DeviceKind::Ethernet => {}
            DeviceKind::Vlan(vlan) => {
                obj.insert("vlan_id".into(), json!(vlan.vlan_id));
                obj.insert("parent_device".into(), json!(vlan.parent_device));
            }
            DeviceKind::Bond(bond) => {
                obj.insert("bond_slaves".into(), json!(bond.slaves));
                obj.insert("bond_primary".into(), json!(bond.primary));
                obj.insert("bond_mode".into(), json!(bond.mode.map(BondMode::code)));
                obj.insert("bond_miimon".into(), json!(bond.miimon));
            }
            DeviceKind::Bridge(bridge) => {
                obj.insert("bridge_ports".into(), json!(bridge.ports));
                obj.insert("bridge_fd".into(), json!(bridge.forward_delay));
            }
        }

        obj
    }
}

// Serde goes through the wire record so structured output matches what the
// server sees.

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_object().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = DeviceRecord::deserialize(deserializer)?;
        create_device(&record).map_err(serde::de::Error::custom)
    }
}
