// ── Device domain types ──

use super::address::{Ip4Address, Ip6Address};
use super::kind::{BondMode, InterfaceType};

/// VLAN-specific settings. The parent is a reference by name; the parent
/// device does not know about its VLANs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VlanConfig {
    pub vlan_id: Option<u16>,
    pub parent_device: Option<String>,
}

/// Bonding settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BondConfig {
    pub slaves: Vec<String>,
    pub primary: Vec<String>,
    pub mode: Option<BondMode>,
    pub miimon: Option<u32>,
}

/// Bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    pub ports: Vec<String>,
    /// Forwarding delay in seconds.
    pub forward_delay: u32,
}

/// Kind-specific part of a [`Device`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    Ethernet,
    Vlan(VlanConfig),
    Bridge(BridgeConfig),
    Bond(BondConfig),
}

/// The configuration record of one network interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Device {
    pub name: String,
    pub ip4: Vec<Ip4Address>,
    pub ip6: Vec<Ip6Address>,
    /// DHCP. When set, `ip4` is ignored.
    pub ip4dynamic: bool,
    /// SLAAC. When set, `ip6` is ignored.
    pub ip6dynamic: bool,
    pub options: Vec<String>,
    /// Bring the interface up at boot.
    pub start: bool,
    pub kind: DeviceKind,
}

impl Device {
    // ── Constructors ─────────────────────────────────────────────────

    /// A bare Ethernet device with no addressing.
    pub fn ethernet(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn vlan(name: impl Into<String>, parent: impl Into<String>, vlan_id: u16) -> Self {
        Self {
            name: name.into(),
            kind: DeviceKind::Vlan(VlanConfig {
                vlan_id: Some(vlan_id),
                parent_device: Some(parent.into()),
            }),
            ..Self::default()
        }
    }

    pub fn bond<I, S>(name: impl Into<String>, slaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: DeviceKind::Bond(BondConfig {
                slaves: slaves.into_iter().map(Into::into).collect(),
                ..BondConfig::default()
            }),
            ..Self::default()
        }
    }

    pub fn bridge<I, S>(name: impl Into<String>, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: DeviceKind::Bridge(BridgeConfig {
                ports: ports.into_iter().map(Into::into).collect(),
                forward_delay: 0,
            }),
            ..Self::default()
        }
    }

    /// A default device of the given kind, as created by "Add interface".
    pub fn with_type(name: impl Into<String>, interface_type: InterfaceType) -> Self {
        let kind = match interface_type {
            InterfaceType::Ethernet => DeviceKind::Ethernet,
            InterfaceType::Vlan => DeviceKind::Vlan(VlanConfig::default()),
            InterfaceType::Bridge => DeviceKind::Bridge(BridgeConfig::default()),
            InterfaceType::Bond => DeviceKind::Bond(BondConfig::default()),
        };
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    // ── Builder helpers ──────────────────────────────────────────────

    pub fn with_ip4(mut self, address: impl Into<String>, netmask: impl Into<String>) -> Self {
        self.ip4.push(Ip4Address::new(address, netmask));
        self
    }

    pub fn with_ip6(
        mut self,
        address: impl Into<String>,
        prefix: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        self.ip6.push(Ip6Address::new(address, prefix, identifier));
        self
    }

    pub fn with_dhcp(mut self) -> Self {
        self.ip4dynamic = true;
        self
    }

    pub fn with_slaac(mut self) -> Self {
        self.ip6dynamic = true;
        self
    }

    pub fn with_start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }

    // ── Kind queries ─────────────────────────────────────────────────

    pub fn interface_type(&self) -> InterfaceType {
        match self.kind {
            DeviceKind::Ethernet => InterfaceType::Ethernet,
            DeviceKind::Vlan(_) => InterfaceType::Vlan,
            DeviceKind::Bridge(_) => InterfaceType::Bridge,
            DeviceKind::Bond(_) => InterfaceType::Bond,
        }
    }

    pub fn is_ethernet(&self) -> bool {
        matches!(self.kind, DeviceKind::Ethernet)
    }

    pub fn is_vlan(&self) -> bool {
        matches!(self.kind, DeviceKind::Vlan(_))
    }

    pub fn is_bond(&self) -> bool {
        matches!(self.kind, DeviceKind::Bond(_))
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self.kind, DeviceKind::Bridge(_))
    }

    pub fn is_composite(&self) -> bool {
        self.interface_type().is_composite()
    }

    /// Whether the name appears in the hardware-detected interface list.
    pub fn is_physical_in(&self, physical_interfaces: &[String]) -> bool {
        physical_interfaces.iter().any(|p| *p == self.name)
    }

    /// Member interfaces owned by this device.
    ///
    /// A VLAN's parent is a reference, not ownership, so VLANs (like
    /// Ethernet devices) own nothing.
    pub fn subdevice_names(&self) -> &[String] {
        match &self.kind {
            DeviceKind::Bond(bond) => bond.slaves.as_slice(),
            DeviceKind::Bridge(bridge) => bridge.ports.as_slice(),
            DeviceKind::Ethernet | DeviceKind::Vlan(_) => &[],
        }
    }

    pub fn has_subdevice(&self, name: &str) -> bool {
        self.subdevice_names().iter().any(|n| n == name)
    }

    pub fn vlan_parent(&self) -> Option<&str> {
        match &self.kind {
            DeviceKind::Vlan(vlan) => vlan.parent_device.as_deref(),
            _ => None,
        }
    }

    pub fn vlan_id(&self) -> Option<u16> {
        match &self.kind {
            DeviceKind::Vlan(vlan) => vlan.vlan_id,
            _ => None,
        }
    }

    // ── Addressing ───────────────────────────────────────────────────

    /// Static IPv4 entries that take effect (none under DHCP).
    pub fn effective_ip4(&self) -> &[Ip4Address] {
        if self.ip4dynamic { &[] } else { self.ip4.as_slice() }
    }

    /// Static IPv6 entries that take effect (none under SLAAC).
    pub fn effective_ip6(&self) -> &[Ip6Address] {
        if self.ip6dynamic { &[] } else { self.ip6.as_slice() }
    }

    pub fn has_addressing(&self) -> bool {
        self.ip4dynamic || self.ip6dynamic || !self.ip4.is_empty() || !self.ip6.is_empty()
    }

    /// Drop all standalone addressing (done when the device becomes a member).
    pub fn clear_addressing(&mut self) {
        self.ip4.clear();
        self.ip6.clear();
        self.ip4dynamic = false;
        self.ip6dynamic = false;
    }

    /// Copy the addressing of `snapshot` onto this device.
    pub fn restore_addressing(&mut self, snapshot: &Device) {
        self.ip4.clone_from(&snapshot.ip4);
        self.ip6.clone_from(&snapshot.ip6);
        self.ip4dynamic = snapshot.ip4dynamic;
        self.ip6dynamic = snapshot.ip6dynamic;
    }

    // ── Presentation ─────────────────────────────────────────────────

    /// Human-readable one-line summary of this device's configuration.
    ///
    /// Pure function of the device's fields.
    pub fn configuration_description(&self) -> String {
        let mut parts = Vec::new();

        match &self.kind {
            DeviceKind::Ethernet => {}
            DeviceKind::Vlan(vlan) => {
                let id = vlan.vlan_id.map_or_else(|| "?".to_owned(), |id| id.to_string());
                match vlan.parent_device.as_deref() {
                    Some(parent) => parts.push(format!("VLAN {id} on {parent}")),
                    None => parts.push(format!("VLAN {id}")),
                }
            }
            DeviceKind::Bond(bond) => {
                let mode = bond
                    .mode
                    .map_or_else(String::new, |m| format!(" ({m})"));
                parts.push(format!("Bond{mode}: {}", member_list(&bond.slaves)));
            }
            DeviceKind::Bridge(bridge) => {
                parts.push(format!("Bridge: {}", member_list(&bridge.ports)));
            }
        }

        if self.ip4dynamic {
            parts.push("IPv4 dynamic (DHCP)".into());
        } else {
            let ip4: Vec<String> = self
                .ip4
                .iter()
                .filter(|a| a.is_complete())
                .map(ToString::to_string)
                .collect();
            if !ip4.is_empty() {
                parts.push(format!("IPv4 {}", ip4.join(", ")));
            }
        }

        if self.ip6dynamic {
            parts.push("IPv6 autoconfiguration (SLAAC)".into());
        } else {
            let ip6: Vec<String> = self
                .ip6
                .iter()
                .filter(|a| a.is_complete())
                .map(|a| format!("{}/{}", a.address, a.prefix))
                .collect();
            if !ip6.is_empty() {
                parts.push(format!("IPv6 {}", ip6.join(", ")));
            }
        }

        if parts.is_empty() {
            "unconfigured".into()
        } else {
            parts.join("; ")
        }
    }
}

fn member_list(names: &[String]) -> String {
    if names.is_empty() {
        "none".into()
    } else {
        names.join(", ")
    }
}
