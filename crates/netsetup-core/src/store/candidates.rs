// ── Candidate queries ──
//
// Which interfaces may be picked for a device of a given kind. Everything
// is computed from the current state on each call. A member already owned
// by one composite is never offered to another, except that the device
// being edited keeps its own current members (and a VLAN its parent).

use strum::IntoEnumIterator;

use super::InterfaceCollection;
use super::consistency::contains_transitively;
use crate::model::{Device, InterfaceType};

impl InterfaceCollection {
    /// Kinds for which at least one valid candidate exists.
    pub fn possible_types(&self, name: &str) -> Vec<InterfaceType> {
        InterfaceType::iter()
            .filter(|ty| !self.candidates(name, *ty).is_empty())
            .collect()
    }

    /// Candidate members or parent for a device of kind `ty`.
    pub fn candidates(&self, name: &str, ty: InterfaceType) -> Vec<String> {
        match ty {
            InterfaceType::Ethernet => self.possible_ethernet_devices(name),
            InterfaceType::Vlan => self.possible_vlan_parent_devices(name),
            InterfaceType::Bond => self.possible_bond_subdevices(name),
            InterfaceType::Bridge => self.possible_bridge_subdevices(name),
        }
    }

    /// Hardware-detected names not yet configured, plus `name` itself when
    /// it is one of them.
    pub fn possible_ethernet_devices(&self, name: &str) -> Vec<String> {
        self.physical
            .iter()
            .filter(|p| *p == name || !self.devices.contains_key(p.as_str()))
            .cloned()
            .collect()
    }

    /// Unused non-VLAN interfaces that do not already contain `name`, plus
    /// the current parent when `name` is an existing VLAN.
    pub fn possible_vlan_parent_devices(&self, name: &str) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .known_interfaces()
            .into_iter()
            .filter(|d| d.name != name && !d.is_vlan() && !self.in_use(&d.name))
            .filter(|d| !contains_transitively(&self.devices, &d.name, name, None))
            .map(|d| d.name)
            .collect();

        if let Some(parent) = self.get_interface(name).and_then(Device::vlan_parent) {
            if !candidates.iter().any(|c| c == parent) {
                candidates.push(parent.to_owned());
            }
        }
        candidates
    }

    /// Unused physical Ethernet interfaces, plus the current slaves of
    /// `name`.
    pub fn possible_bond_subdevices(&self, name: &str) -> Vec<String> {
        self.member_candidates(name, |d| d.is_ethernet() && self.is_physical(&d.name))
    }

    /// Unused interfaces that are not Bridges, plus the current ports of
    /// `name`.
    pub fn possible_bridge_subdevices(&self, name: &str) -> Vec<String> {
        self.member_candidates(name, |d| !d.is_bridge())
    }

    fn member_candidates(&self, name: &str, eligible: impl Fn(&Device) -> bool) -> Vec<String> {
        self.known_interfaces()
            .into_iter()
            .filter(|d| d.name != name && eligible(d))
            .filter(|d| self.owner(&d.name).is_none_or(|owner| owner.name == name))
            .filter(|d| !contains_transitively(&self.devices, &d.name, name, None))
            .map(|d| d.name)
            .collect()
    }
}
