// ── Interface collection ──
//
// Ordered, name-keyed storage for one configuration session. Every
// mutation is validated first, then committed, then announced to
// listeners. Member clearing/restoring is deferred to the effect queue
// and only happens when the owner calls `run_pending_effects`.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::consistency::{ConsistencyEngine, DeviceMap, MembershipDelta, validate};
use super::effects::Effect;
use crate::config::SessionConfig;
use crate::convert::{DeviceRecord, create_device};
use crate::error::CoreError;
use crate::model::{Device, DeviceKind};
use crate::stream::{CollectionEvent, ListenerRegistry, Subscription};

/// The interface configuration of one session.
///
/// Insertion order is preserved; replacing an existing name keeps its
/// position. Queries are computed fresh from the current state and never
/// fail.
#[derive(Debug, Default)]
pub struct InterfaceCollection {
    pub(super) devices: DeviceMap,
    pub(super) physical: Vec<String>,
    pub(super) primary: Option<String>,
    pub(super) engine: ConsistencyEngine,
    listeners: ListenerRegistry,
    version: u64,
}

impl InterfaceCollection {
    pub fn new(config: SessionConfig) -> Self {
        let mut collection = Self::default();
        collection.set_physical_interfaces(config.physical_interfaces);
        collection
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Insert a new interface. Fails with [`CoreError::NameConflict`] if the
    /// name is taken.
    pub fn add(&mut self, device: Device) -> Result<(), CoreError> {
        if self.devices.contains_key(&device.name) {
            return Err(CoreError::NameConflict { name: device.name });
        }
        self.put(device)
    }

    /// Insert or replace by name.
    ///
    /// A member keeps its kind while it is in use. Addressing given to a
    /// member becomes its cached configuration and is cleared like on
    /// absorption, so it comes back when the member is released.
    pub fn put(&mut self, device: Device) -> Result<(), CoreError> {
        validate(&self.devices, &device, None)?;

        if device.has_addressing() && self.in_use(&device.name) {
            debug!(interface = %device.name, "member given addressing, caching it");
            self.engine.absorb(&device);
        }

        let mut events = Vec::new();
        self.store(device, &mut events);
        self.commit(events);
        Ok(())
    }

    /// Parse a wire record and [`put`](Self::put) the result.
    pub fn put_object(&mut self, record: &DeviceRecord) -> Result<(), CoreError> {
        self.put(create_device(record)?)
    }

    /// Delete by name, releasing its members. Interfaces that are members
    /// of a composite cannot be removed; VLAN parents can.
    pub fn remove(&mut self, name: &str) -> Result<Device, CoreError> {
        if let Some(owner) = self.owner(name) {
            return Err(CoreError::InterfaceInUse {
                name: name.to_owned(),
                owner: owner.name.clone(),
            });
        }

        let mut events = Vec::new();
        let removed = self.delete(name, &mut events)?;
        if self.primary.as_deref() == Some(name) {
            self.primary = None;
            events.push(CollectionEvent::PrimaryChanged { primary: None });
        }
        self.commit(events);
        Ok(removed)
    }

    /// Rename as remove + add. VLANs referencing the old name and the
    /// primary selection follow the new name.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), CoreError> {
        let current = self
            .devices
            .get(old)
            .ok_or_else(|| CoreError::InterfaceNotFound {
                name: old.to_owned(),
            })?;
        if old == new {
            return Ok(());
        }
        if self.devices.contains_key(new) {
            return Err(CoreError::NameConflict {
                name: new.to_owned(),
            });
        }
        if let Some(owner) = self.owner(old) {
            return Err(CoreError::InterfaceInUse {
                name: old.to_owned(),
                owner: owner.name.clone(),
            });
        }

        let mut renamed = current.clone();
        new.clone_into(&mut renamed.name);
        validate(&self.devices, &renamed, Some(old))?;

        let mut events = Vec::new();
        self.delete(old, &mut events)?;
        self.store(renamed, &mut events);

        for (index, device) in self.devices.values_mut().enumerate() {
            if let DeviceKind::Vlan(vlan) = &mut device.kind {
                if vlan.parent_device.as_deref() == Some(old) {
                    vlan.parent_device = Some(new.to_owned());
                    events.push(CollectionEvent::Updated {
                        name: device.name.clone(),
                        index,
                    });
                }
            }
        }

        if self.primary.as_deref() == Some(old) {
            self.primary = Some(new.to_owned());
            events.push(CollectionEvent::PrimaryChanged {
                primary: self.primary.clone(),
            });
        }

        debug!(old, new, "renamed interface");
        self.commit(events);
        Ok(())
    }

    /// Select the primary interface, or clear the selection with `None`.
    /// The name must be configured or hardware-detected.
    pub fn set_primary_interface(&mut self, name: Option<&str>) -> Result<(), CoreError> {
        if let Some(name) = name {
            if !self.devices.contains_key(name) && !self.is_physical(name) {
                return Err(CoreError::InterfaceNotFound {
                    name: name.to_owned(),
                });
            }
        }
        if self.primary.as_deref() == name {
            return Ok(());
        }

        self.primary = name.map(str::to_owned);
        self.commit(vec![CollectionEvent::PrimaryChanged {
            primary: self.primary.clone(),
        }]);
        Ok(())
    }

    /// Replace the hardware-detected interface list. Duplicates are dropped.
    pub fn set_physical_interfaces<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        self.physical = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| seen.insert(n.clone()))
            .collect();
        self.version += 1;
    }

    // ── Deferred effects ─────────────────────────────────────────────

    /// Apply every queued member clear/restore in insertion order.
    ///
    /// Returns the number of effects applied. Effects whose target no
    /// longer exists are skipped.
    pub fn run_pending_effects(&mut self) -> usize {
        let mut applied = 0;

        while let Some(effect) = self.engine.next_effect() {
            let Some(device) = self.devices.get_mut(effect.target()) else {
                warn!(
                    interface = effect.target(),
                    "deferred effect targets a missing interface, skipping"
                );
                continue;
            };

            let event = match effect {
                Effect::ClearAddressing { name } => {
                    device.clear_addressing();
                    debug!(interface = %name, "cleared member addressing");
                    CollectionEvent::AddressingCleared { name }
                }
                Effect::RestoreAddressing { name, snapshot } => {
                    device.restore_addressing(&snapshot);
                    debug!(interface = %name, "restored member addressing");
                    CollectionEvent::AddressingRestored { name }
                }
            };

            applied += 1;
            self.version += 1;
            self.listeners.emit(&event);
        }

        applied
    }

    pub fn has_pending_effects(&self) -> bool {
        !self.engine.effects().is_empty()
    }

    pub fn pending_effects(&self) -> impl Iterator<Item = &Effect> {
        self.engine.effects().iter()
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Register a listener. It stays registered while the returned handle
    /// lives.
    pub fn subscribe(&self, callback: impl FnMut(&CollectionEvent) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    /// Bumped on every committed change.
    pub fn version(&self) -> u64 {
        self.version
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get_interface(&self, name: &str) -> Option<&Device> {
        self.devices.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.devices.contains_key(name)
    }

    /// Configured interfaces in insertion order.
    pub fn all_interfaces(&self) -> impl ExactSizeIterator<Item = &Device> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn physical_interface_names(&self) -> &[String] {
        &self.physical
    }

    pub fn is_physical(&self, name: &str) -> bool {
        self.physical.iter().any(|p| p == name)
    }

    /// One device per hardware-detected name: the configured one, or a
    /// default Ethernet device if the name is not configured.
    pub fn physical_interfaces(&self) -> Vec<Device> {
        self.physical
            .iter()
            .map(|name| {
                self.devices
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| Device::ethernet(name))
            })
            .collect()
    }

    /// Configured interfaces followed by unconfigured physical ones.
    pub fn known_interfaces(&self) -> Vec<Device> {
        let mut all: Vec<Device> = self.devices.values().cloned().collect();
        all.extend(
            self.physical
                .iter()
                .filter(|name| !self.devices.contains_key(name.as_str()))
                .map(Device::ethernet),
        );
        all
    }

    pub fn used_interfaces(&self) -> Vec<Device> {
        self.known_interfaces()
            .into_iter()
            .filter(|d| self.in_use(&d.name))
            .collect()
    }

    pub fn unused_interfaces(&self) -> Vec<Device> {
        self.known_interfaces()
            .into_iter()
            .filter(|d| !self.in_use(&d.name))
            .collect()
    }

    /// Whether some other interface lists `name` as a member.
    pub fn in_use(&self, name: &str) -> bool {
        self.owner(name).is_some()
    }

    /// The composite that lists `name` as a member.
    pub fn owner(&self, name: &str) -> Option<&Device> {
        self.devices
            .values()
            .find(|d| d.name != name && d.has_subdevice(name))
    }

    /// Names blocked from independent editing, as of the last mutation.
    pub fn disabled_interfaces(&self) -> impl Iterator<Item = &str> {
        self.engine.disabled().iter().map(String::as_str)
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.engine.disabled().contains(name)
    }

    pub fn primary_interface(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Configuration a member had before it was absorbed, while it stays a
    /// member.
    pub fn cached_configuration(&self, name: &str) -> Option<&Device> {
        self.engine.snapshot(name)
    }

    /// Every cached configuration, ordered by name.
    pub fn cached_configurations(&self) -> impl Iterator<Item = &Device> {
        self.engine.snapshots()
    }

    /// Hand back a configuration cached by an earlier session, replacing
    /// whatever absorption cached for that member.
    ///
    /// Returns `false` and ignores it when the name is not in use.
    pub fn seed_cached_configuration(&mut self, snapshot: Device) -> bool {
        if !self.in_use(&snapshot.name) {
            debug!(interface = %snapshot.name, "not a member, dropping cached configuration");
            return false;
        }
        self.engine.seed(snapshot);
        true
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Insert or replace without validation, then run the membership
    /// transition for the stored device.
    fn store(&mut self, device: Device, events: &mut Vec<CollectionEvent>) {
        let name = device.name.clone();
        let delta = MembershipDelta::between(self.devices.get(&name), Some(&device));
        let (index, previous) = self.devices.insert_full(name.clone(), device);

        if previous.is_some() {
            debug!(interface = %name, index, "updated interface");
            events.push(CollectionEvent::Updated { name, index });
        } else {
            debug!(interface = %name, index, "added interface");
            events.push(CollectionEvent::Added { name, index });
        }

        self.apply_delta(delta, events);
    }

    fn delete(&mut self, name: &str, events: &mut Vec<CollectionEvent>) -> Result<Device, CoreError> {
        let (index, _, removed) =
            self.devices
                .shift_remove_full(name)
                .ok_or_else(|| CoreError::InterfaceNotFound {
                    name: name.to_owned(),
                })?;

        debug!(interface = name, index, "removed interface");
        events.push(CollectionEvent::Removed {
            name: name.to_owned(),
            index,
        });
        self.apply_delta(MembershipDelta::between(Some(&removed), None), events);
        Ok(removed)
    }

    fn apply_delta(&mut self, delta: MembershipDelta, events: &mut Vec<CollectionEvent>) {
        if delta.is_empty() {
            return;
        }

        for member in &delta.released {
            self.engine.release(member);
        }

        for member in delta.absorbed {
            if let Some(existing) = self.devices.get(&member) {
                self.engine.absorb(existing);
            } else {
                let (index, _) = self
                    .devices
                    .insert_full(member.clone(), Device::ethernet(member.as_str()));
                debug!(interface = %member, index, "synthesized member interface");
                events.push(CollectionEvent::Added {
                    name: member,
                    index,
                });
            }
        }
    }

    /// Recompute the disabled set, bump the version and notify listeners.
    fn commit(&mut self, events: Vec<CollectionEvent>) {
        self.engine.recompute_disabled(&self.devices);
        self.version += 1;
        for event in events {
            self.listeners.emit(&event);
        }
    }

    /// Announce a wholesale replacement of the state.
    pub(super) fn commit_reset(&mut self) {
        self.commit(vec![CollectionEvent::Reset]);
    }
}
