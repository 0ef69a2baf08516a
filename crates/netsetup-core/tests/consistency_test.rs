// Integration tests for the interface collection and its consistency pass.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use serde_json::json;

use netsetup_core::{
    BondMode, CoreError, Device, DeviceKind, InterfaceCollection, InterfaceData, InterfaceType,
    Ip4Address, SessionConfig, create_device,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn session(physical: &[&str]) -> InterfaceCollection {
    InterfaceCollection::new(SessionConfig::with_physical(physical.iter().copied()))
}

fn unused_names(c: &InterfaceCollection) -> Vec<String> {
    c.unused_interfaces().into_iter().map(|d| d.name).collect()
}

fn static_eth(name: &str, addr: &str) -> Device {
    Device::ethernet(name).with_ip4(addr, "255.255.255.0")
}

// ── Wire round trip ─────────────────────────────────────────────────

#[test]
fn test_round_trip_every_kind() {
    let mut bond = Device::bond("bond0", ["eth0", "eth1"])
        .with_ip6("2001:db8::5", "64", "default")
        .with_start(true);
    if let DeviceKind::Bond(cfg) = &mut bond.kind {
        cfg.mode = Some(BondMode::Lacp);
        cfg.miimon = Some(100);
        cfg.primary = vec!["eth0".into()];
    }
    let mut bridge = Device::bridge("br0", ["bond0"]).with_dhcp().with_slaac();
    if let DeviceKind::Bridge(cfg) = &mut bridge.kind {
        cfg.forward_delay = 15;
    }
    let mut eth = static_eth("eth2", "198.51.100.7");
    eth.options = vec!["mtu 9000".into()];

    let devices = [
        eth,
        Device::vlan("eth2.100", "eth2", 100),
        Device::with_type("vlan9", InterfaceType::Vlan),
        bond,
        bridge,
    ];

    for device in devices {
        let first = device.to_object();
        let second = create_device(&first).unwrap().to_object();
        assert_eq!(second, first, "round trip of {}", device.name);
        assert_eq!(create_device(&first).unwrap(), device);
    }
}

// ── Uniqueness ──────────────────────────────────────────────────────

#[test]
fn test_names_stay_unique_across_mutations() {
    let mut c = session(&["eth0", "eth1", "eth2"]);
    c.add(Device::ethernet("eth0")).unwrap();
    assert!(c.add(Device::ethernet("eth0")).unwrap_err().is_name_conflict());
    c.put(Device::bond("bond0", ["eth0", "eth1"])).unwrap();
    c.put(Device::bond("bond0", ["eth1", "eth2"])).unwrap();
    c.rename("bond0", "eth9").unwrap();
    assert!(c.rename("eth9", "eth2").unwrap_err().is_name_conflict());
    c.remove("eth9").unwrap();
    c.put(Device::ethernet("eth1").with_dhcp()).unwrap();
    c.run_pending_effects();

    let names: Vec<&str> = c.all_interfaces().map(|d| d.name.as_str()).collect();
    let distinct: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(names.len(), distinct.len());
}

// ── Membership exclusivity ──────────────────────────────────────────

#[test]
fn test_candidate_lists_keep_membership_disjoint() {
    let mut c = session(&["eth0", "eth1", "eth2", "eth3", "eth4"]);

    let bond0: Vec<String> = c.possible_bond_subdevices("bond0").into_iter().take(2).collect();
    c.add(Device::bond("bond0", bond0)).unwrap();

    let br0: Vec<String> = c.possible_bridge_subdevices("br0").into_iter().take(2).collect();
    c.add(Device::bridge("br0", br0)).unwrap();

    let bond1 = c.possible_bond_subdevices("bond1");
    c.add(Device::bond("bond1", bond1)).unwrap();

    let br1 = c.possible_bridge_subdevices("br1");
    c.add(Device::bridge("br1", br1)).unwrap();
    c.run_pending_effects();

    let mut seen = HashSet::new();
    for composite in c.all_interfaces().filter(|d| d.is_composite()) {
        for member in composite.subdevice_names() {
            assert!(seen.insert(member.clone()), "{member} has two owners");
        }
    }
    assert!(!seen.is_empty());
}

// ── Snapshot / restore ──────────────────────────────────────────────

#[test]
fn test_bond_removal_restores_member_configuration() {
    let mut c = session(&["eth0"]);
    let mut eth0 = static_eth("eth0", "192.0.2.1")
        .with_ip6("2001:db8::1", "64", "default")
        .with_slaac();
    eth0.start = true;
    c.add(eth0.clone()).unwrap();

    c.add(Device::bond("bond0", ["eth0"])).unwrap();
    c.run_pending_effects();
    let absorbed = c.get_interface("eth0").unwrap();
    assert!(!absorbed.has_addressing());
    assert!(absorbed.start);

    c.remove("bond0").unwrap();
    c.run_pending_effects();
    assert_eq!(c.get_interface("eth0"), Some(&eth0));
}

#[test]
fn test_update_releases_dropped_members_only() {
    let mut c = session(&["eth0", "eth1"]);
    c.add(static_eth("eth0", "192.0.2.1")).unwrap();
    c.add(static_eth("eth1", "192.0.2.2")).unwrap();
    c.add(Device::bridge("br0", ["eth0", "eth1"])).unwrap();
    c.run_pending_effects();

    // Re-putting with the same members must not snapshot the cleared state.
    c.put(Device::bridge("br0", ["eth0", "eth1"]).with_dhcp())
        .unwrap();
    c.run_pending_effects();
    c.put(Device::bridge("br0", ["eth1"])).unwrap();
    c.run_pending_effects();

    assert_eq!(
        c.get_interface("eth0").unwrap().ip4,
        [Ip4Address::new("192.0.2.1", "255.255.255.0")]
    );
    assert!(c.get_interface("eth1").unwrap().ip4.is_empty());
    assert!(!c.in_use("eth0"));
    assert!(c.in_use("eth1"));
}

#[test]
fn test_type_change_releases_all_members() {
    let mut c = session(&["eth0"]);
    c.add(static_eth("eth0", "192.0.2.1")).unwrap();
    c.add(Device::bond("bond0", ["eth0"])).unwrap();
    c.run_pending_effects();

    c.put(Device::with_type("bond0", InterfaceType::Ethernet))
        .unwrap();
    c.run_pending_effects();

    assert!(!c.in_use("eth0"));
    assert_eq!(c.get_interface("eth0").unwrap().ip4.len(), 1);
}

// ── Disabling ───────────────────────────────────────────────────────

#[test]
fn test_members_are_never_unused() {
    let mut c = session(&["eth0", "eth1"]);
    c.add(Device::bond("bond0", ["eth1"])).unwrap();

    assert!(!unused_names(&c).contains(&"eth1".to_owned()));
    assert!(c.is_disabled("eth1"));
    assert_eq!(c.disabled_interfaces().collect::<Vec<_>>(), ["eth1"]);

    c.remove("bond0").unwrap();
    assert!(unused_names(&c).contains(&"eth1".to_owned()));
    assert!(!c.is_disabled("eth1"));
}

#[test]
fn test_vlan_parent_stays_available() {
    let mut c = session(&["eth0", "eth1"]);
    c.add(Device::vlan("eth0.10", "eth0", 10)).unwrap();

    assert!(!c.in_use("eth0"));
    assert!(unused_names(&c).contains(&"eth0".to_owned()));
    assert!(c.possible_bond_subdevices("bond0").contains(&"eth0".to_owned()));
    assert!(c.possible_bridge_subdevices("br0").contains(&"eth0".to_owned()));
    assert!(!c.is_disabled("eth0"));
}

// ── Topology guards through the public API ──────────────────────────

#[test]
fn test_invalid_topologies_are_rejected() {
    let mut c = session(&["eth0", "eth1"]);
    c.add(Device::bridge("br0", ["eth0"])).unwrap();
    c.add(Device::vlan("eth1.5", "eth1", 5)).unwrap();

    assert!(matches!(
        c.add(Device::bridge("br1", ["br0"])),
        Err(CoreError::InvalidTopology { .. })
    ));
    assert!(matches!(
        c.add(Device::bond("bond0", ["eth0"])),
        Err(CoreError::InvalidTopology { .. })
    ));
    assert!(matches!(
        c.add(Device::vlan("v5", "eth1", 5)),
        Err(CoreError::DuplicateVlan { vlan_id: 5, .. })
    ));
    assert!(matches!(
        c.add(Device::vlan("v6", "eth1", 4097)),
        Err(CoreError::ValidationFailed { .. })
    ));
    assert!(matches!(
        c.remove("eth0"),
        Err(CoreError::InterfaceInUse { .. })
    ));
}

// ── Bulk load ───────────────────────────────────────────────────────

#[test]
fn test_bulk_load_matches_interactive_edits() {
    let mut interactive = session(&["eth0", "eth1"]);
    interactive.add(static_eth("eth0", "192.0.2.1")).unwrap();
    interactive.add(Device::bond("bond0", ["eth0", "eth1"]).with_dhcp()).unwrap();
    interactive.add(Device::vlan("bond0.3", "bond0", 3)).unwrap();
    interactive.run_pending_effects();

    let mut loaded = session(&["eth0", "eth1"]);
    loaded
        .set_data(
            serde_json::from_value::<InterfaceData>(json!({
                "interfaces": {
                    "bond0.3": {"interfaceType": "VLAN", "vlan_id": 3, "parent_device": "bond0"},
                    "bond0": {"interfaceType": "Bond", "bond_slaves": ["eth0", "eth1"], "ip4dynamic": true},
                    "eth0": {"interfaceType": "Ethernet", "ip4": [["192.0.2.1", "255.255.255.0"]]},
                }
            }))
            .unwrap(),
        )
        .unwrap();

    for device in interactive.all_interfaces() {
        assert_eq!(loaded.get_interface(&device.name), Some(device));
        assert_eq!(
            loaded.cached_configuration(&device.name),
            interactive.cached_configuration(&device.name)
        );
    }
    assert_eq!(loaded.len(), interactive.len());
}

// ── Scenario ────────────────────────────────────────────────────────

#[test]
fn test_bond_lifecycle_scenario() {
    let mut c = session(&["eth0", "eth1"]);

    c.add(static_eth("eth0", "192.0.2.1")).unwrap();
    c.add(Device::bond("bond0", ["eth0", "eth1"])).unwrap();
    c.run_pending_effects();

    assert!(c.get_interface("eth0").unwrap().ip4.is_empty());
    assert_eq!(c.get_interface("eth1"), Some(&Device::ethernet("eth1")));
    assert!(c.in_use("eth0"));
    assert!(c.in_use("eth1"));

    c.remove("bond0").unwrap();
    c.run_pending_effects();

    assert_eq!(
        c.get_interface("eth0").unwrap().ip4,
        [Ip4Address::new("192.0.2.1", "255.255.255.0")]
    );
    assert_eq!(c.get_interface("eth1"), Some(&Device::ethernet("eth1")));
    assert!(!c.in_use("eth0"));
    assert!(!c.in_use("eth1"));
}

// ── Summary ─────────────────────────────────────────────────────────

#[test]
fn test_summary_text() {
    let mut c = session(&["eth0", "eth1", "eth2"]);
    c.add(static_eth("eth0", "192.0.2.1").with_ip6("2001:db8::1", "64", "default"))
        .unwrap();
    c.add(Device::bond("bond0", ["eth1", "eth2"]).with_dhcp().with_slaac())
        .unwrap();
    c.set_primary_interface(Some("bond0")).unwrap();
    c.run_pending_effects();

    insta::assert_snapshot!(c.summary().to_string(), @r"
    IPv4 addresses:
      eth0: 192.0.2.1/255.255.255.0
      bond0: Dynamic (DHCP)
    IPv6 addresses:
      eth0: default: 2001:db8::1/64
      bond0: Autoconfiguration (SLAAC)
    IPv6 autoconfiguration: bond0
    Members:
      eth1: member of bond0
      eth2: member of bond0
    Primary interface: bond0
    ");
}
