// ── Interface store ──
//
// `InterfaceCollection` and the machinery behind it: topology guards and
// membership transitions (consistency), deferred member effects, candidate
// queries, and bulk load/export.

mod bulk;
mod candidates;
mod collection;
mod consistency;
mod effects;

pub use bulk::InterfaceData;
pub use collection::InterfaceCollection;
pub use consistency::MAX_VLAN_ID;
pub use effects::Effect;
