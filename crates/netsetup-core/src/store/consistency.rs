// ── Consistency engine ──
//
// Tracks what each mutation does to composite membership. Newly absorbed
// members have their configuration cached and their addressing cleared;
// released members get the cached configuration back. Both happen through
// the deferred effect queue. The engine also owns the disabled set and the
// topology guards that run before any mutation commits.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::effects::{Effect, EffectQueue};
use crate::error::CoreError;
use crate::model::{Device, DeviceKind, VlanConfig};

pub(crate) type DeviceMap = IndexMap<String, Device>;

/// Highest VLAN id accepted.
pub const MAX_VLAN_ID: u16 = 4096;

/// Members gained and lost by one mutation.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct MembershipDelta {
    pub absorbed: Vec<String>,
    pub released: Vec<String>,
}

impl MembershipDelta {
    /// Compare the member lists before and after a mutation. A deletion
    /// passes `None` as `current` and releases every former member.
    pub(crate) fn between(previous: Option<&Device>, current: Option<&Device>) -> Self {
        let old = previous.map_or(&[][..], Device::subdevice_names);
        let new = current.map_or(&[][..], Device::subdevice_names);
        Self {
            absorbed: new.iter().filter(|n| !old.contains(n)).cloned().collect(),
            released: old.iter().filter(|n| !new.contains(n)).cloned().collect(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.absorbed.is_empty() && self.released.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConsistencyEngine {
    /// Pre-membership configuration of every absorbed member.
    snapshots: BTreeMap<String, Device>,
    /// Names currently listed as members by some composite.
    disabled: BTreeSet<String>,
    effects: EffectQueue,
}

impl ConsistencyEngine {
    /// An existing device just became a member.
    ///
    /// When a restore for it is still queued, that restore's configuration
    /// is what gets cached, not the cleared state it currently holds.
    pub(crate) fn absorb(&mut self, member: &Device) {
        let snapshot = self
            .effects
            .pending_restore(&member.name)
            .cloned()
            .unwrap_or_else(|| member.clone());
        debug!(member = %member.name, "caching pre-membership configuration");
        self.snapshots.insert(member.name.clone(), snapshot);
        self.effects.push(Effect::ClearAddressing {
            name: member.name.clone(),
        });
    }

    /// A member left its composite.
    pub(crate) fn release(&mut self, name: &str) {
        let Some(snapshot) = self.snapshots.remove(name) else {
            debug!(member = name, "released member has no cached configuration");
            return;
        };
        debug!(member = name, "scheduling restore of cached configuration");
        self.effects.push(Effect::RestoreAddressing {
            name: name.to_owned(),
            snapshot: Box::new(snapshot),
        });
    }

    pub(crate) fn recompute_disabled(&mut self, devices: &DeviceMap) {
        self.disabled = devices
            .values()
            .filter(|d| !d.is_vlan())
            .flat_map(|d| d.subdevice_names().iter().cloned())
            .collect();
        trace!(disabled = ?self.disabled, "recomputed disabled interfaces");
    }

    pub(crate) fn disabled(&self) -> &BTreeSet<String> {
        &self.disabled
    }

    pub(crate) fn snapshot(&self, name: &str) -> Option<&Device> {
        self.snapshots.get(name)
    }

    pub(crate) fn snapshots(&self) -> impl Iterator<Item = &Device> {
        self.snapshots.values()
    }

    /// Take a snapshot as-is, without queueing anything.
    pub(crate) fn seed(&mut self, snapshot: Device) {
        self.snapshots.insert(snapshot.name.clone(), snapshot);
    }

    pub(crate) fn next_effect(&mut self) -> Option<Effect> {
        self.effects.pop()
    }

    pub(crate) fn effects(&self) -> &EffectQueue {
        &self.effects
    }
}

// ── Topology guards ─────────────────────────────────────────────────

/// The collection as it will look once the candidate is stored: the entry
/// with the candidate's own name is being replaced, and the entry named
/// `replacing` (a rename's old name) is going away.
struct View<'a> {
    devices: &'a DeviceMap,
    name: &'a str,
    replacing: Option<&'a str>,
}

impl<'a> View<'a> {
    fn others(&self) -> impl Iterator<Item = &'a Device> + 'a {
        let (name, replacing) = (self.name, self.replacing);
        self.devices
            .values()
            .filter(move |d| d.name != name && Some(d.name.as_str()) != replacing)
    }

    fn lookup(&self, name: &str) -> Option<&'a Device> {
        self.devices
            .get(name)
            .filter(|d| Some(d.name.as_str()) != self.replacing)
    }
}

/// Check that storing `candidate` keeps the topology valid.
pub(crate) fn validate(
    devices: &DeviceMap,
    candidate: &Device,
    replacing: Option<&str>,
) -> Result<(), CoreError> {
    let name = candidate.name.as_str();
    if name.trim().is_empty() {
        return Err(CoreError::ValidationFailed {
            field: "name".into(),
            reason: "interface name must not be empty".into(),
        });
    }

    let view = View {
        devices,
        name,
        replacing,
    };

    if let Some(owner) = view.others().find(|d| d.has_subdevice(name)) {
        let retyped = view
            .lookup(name)
            .is_some_and(|current| current.interface_type() != candidate.interface_type());
        if retyped {
            return Err(CoreError::InterfaceInUse {
                name: name.to_owned(),
                owner: owner.name.clone(),
            });
        }
    }

    if candidate.is_bridge() {
        if let Some(owner) = view.others().find(|d| d.is_bridge() && d.has_subdevice(name)) {
            return Err(CoreError::topology(
                name,
                format!("it is a port of bridge {}; bridges cannot be nested", owner.name),
            ));
        }
    }

    validate_members(&view, candidate)?;

    if let DeviceKind::Vlan(vlan) = &candidate.kind {
        validate_vlan(&view, vlan)?;
    }

    Ok(())
}

fn validate_members(view: &View<'_>, candidate: &Device) -> Result<(), CoreError> {
    let name = view.name;
    let field = match candidate.kind {
        DeviceKind::Bond(_) => "bond_slaves",
        DeviceKind::Bridge(_) => "bridge_ports",
        DeviceKind::Ethernet | DeviceKind::Vlan(_) => return Ok(()),
    };

    let mut seen = HashSet::new();
    for member in candidate.subdevice_names() {
        if member.trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                field: field.into(),
                reason: "member name must not be empty".into(),
            });
        }
        if member == name || Some(member.as_str()) == view.replacing {
            return Err(CoreError::topology(
                name,
                "an interface cannot be a member of itself",
            ));
        }
        if !seen.insert(member.as_str()) {
            return Err(CoreError::ValidationFailed {
                field: field.into(),
                reason: format!("{member} is listed more than once"),
            });
        }
        if candidate.is_bridge() && view.lookup(member).is_some_and(Device::is_bridge) {
            return Err(CoreError::topology(
                name,
                format!("bridge {member} cannot be a bridge port"),
            ));
        }
        if let Some(owner) = view.others().find(|d| d.has_subdevice(member)) {
            return Err(CoreError::topology(
                name,
                format!("{member} is already a member of {}", owner.name),
            ));
        }
        if contains_transitively(view.devices, member, name, view.replacing) {
            return Err(CoreError::topology(
                name,
                format!("{member} leads back to {name}; membership would form a cycle"),
            ));
        }
    }

    Ok(())
}

fn validate_vlan(view: &View<'_>, vlan: &VlanConfig) -> Result<(), CoreError> {
    let name = view.name;

    if let Some(id) = vlan.vlan_id {
        if !(1..=MAX_VLAN_ID).contains(&id) {
            return Err(CoreError::ValidationFailed {
                field: "vlan_id".into(),
                reason: format!("expected 1-{MAX_VLAN_ID}, got {id}"),
            });
        }
    }

    if let Some(parent) = vlan.parent_device.as_deref() {
        if parent == name {
            return Err(CoreError::topology(name, "a VLAN cannot be its own parent"));
        }
        if view.lookup(parent).is_some_and(Device::is_vlan) {
            return Err(CoreError::topology(
                name,
                format!("parent {parent} is itself a VLAN"),
            ));
        }
        if let Some(id) = vlan.vlan_id {
            let duplicate = view
                .others()
                .find(|d| d.vlan_parent() == Some(parent) && d.vlan_id() == Some(id));
            if let Some(existing) = duplicate {
                return Err(CoreError::DuplicateVlan {
                    parent: parent.to_owned(),
                    vlan_id: id,
                    existing: existing.name.clone(),
                });
            }
        }
        if contains_transitively(view.devices, parent, name, view.replacing) {
            return Err(CoreError::topology(
                name,
                format!("{parent} already contains {name}; the VLAN would form a cycle"),
            ));
        }
    }

    if let Some(child) = view.others().find(|d| d.vlan_parent() == Some(name)) {
        return Err(CoreError::topology(
            name,
            format!("it is the parent of VLAN {}", child.name),
        ));
    }

    Ok(())
}

/// Whether `target` is reachable from `from` along membership edges.
///
/// A VLAN also leads to its parent here, so a bridge cannot take its own
/// VLAN as a port. Membership queries do not follow that edge.
pub(crate) fn contains_transitively(
    devices: &DeviceMap,
    from: &str,
    target: &str,
    replacing: Option<&str>,
) -> bool {
    let mut stack = vec![from];
    let mut visited = HashSet::new();

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) || Some(current) == replacing {
            continue;
        }
        if let Some(device) = devices.get(current) {
            stack.extend(device.subdevice_names().iter().map(String::as_str));
            stack.extend(device.vlan_parent());
        }
    }

    false
}
