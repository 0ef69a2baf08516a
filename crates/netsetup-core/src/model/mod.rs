// ── Interface domain model ──
//
// Typed representation of one network interface's configuration. The
// kind is a closed enum, so every site that branches on it is checked
// exhaustively.

pub mod address;
pub mod device;
pub mod kind;

pub use address::{Ip4Address, Ip6Address};
pub use device::{BondConfig, BridgeConfig, Device, DeviceKind, VlanConfig};
pub use kind::{BondMode, InterfaceType};
