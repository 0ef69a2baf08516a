//! netsetup-core: network interface configuration model.
//!
//! Holds the interface configuration of one setup session and keeps it
//! consistent while it is edited: Bond and Bridge devices own member
//! interfaces, members lose their standalone addressing while enslaved and
//! get it back when released, and invalid topologies are rejected before
//! they are committed.
//!
//! ```
//! use netsetup_core::{Device, InterfaceCollection, SessionConfig};
//!
//! let mut interfaces = InterfaceCollection::new(SessionConfig::with_physical(["eth0", "eth1"]));
//! interfaces.add(Device::ethernet("eth0").with_ip4("192.0.2.1", "255.255.255.0"))?;
//! interfaces.add(Device::bond("bond0", ["eth0", "eth1"]))?;
//! interfaces.run_pending_effects();
//!
//! assert!(interfaces.in_use("eth0"));
//! assert!(interfaces.get_interface("eth0").is_some_and(|d| d.ip4.is_empty()));
//! # Ok::<(), netsetup_core::CoreError>(())
//! ```

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;
pub mod summary;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{CommandResult, InterfaceCommand};
pub use config::SessionConfig;
pub use convert::{DeviceRecord, create_device};
pub use error::CoreError;
pub use store::{Effect, InterfaceCollection, InterfaceData, MAX_VLAN_ID};
pub use stream::{CollectionEvent, Subscription};
pub use summary::NetworkSummary;

pub use model::{
    BondConfig, BondMode, BridgeConfig, Device, DeviceKind, InterfaceType, Ip4Address,
    Ip6Address, VlanConfig,
};
