// ── Interface kinds ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::CoreError;

/// The closed set of interface kinds.
///
/// Parsing accepts the short tags used by older records (`eth`, `br`)
/// and is case-insensitive; display always yields the canonical name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum InterfaceType {
    #[strum(to_string = "Ethernet", serialize = "eth")]
    Ethernet,
    #[serde(rename = "VLAN")]
    #[strum(to_string = "VLAN")]
    Vlan,
    #[strum(to_string = "Bridge", serialize = "br")]
    Bridge,
    #[strum(to_string = "Bond")]
    Bond,
}

impl InterfaceType {
    /// Bond and Bridge own member interfaces.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Bond | Self::Bridge)
    }

    /// Position in the bulk-load order: members before their owners,
    /// bonds before the bridges that may contain them.
    pub(crate) fn load_rank(self) -> u8 {
        match self {
            Self::Ethernet => 0,
            Self::Vlan => 1,
            Self::Bond => 2,
            Self::Bridge => 3,
        }
    }
}

/// Linux bonding mode, carried on the wire as its integer code (0-6).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum BondMode {
    #[default]
    #[strum(to_string = "balance-rr")]
    RoundRobin,
    #[strum(to_string = "active-backup")]
    ActiveBackup,
    #[strum(to_string = "balance-xor")]
    Xor,
    #[strum(to_string = "broadcast")]
    Broadcast,
    #[strum(to_string = "802.3ad")]
    Lacp,
    #[strum(to_string = "balance-tlb")]
    Tlb,
    #[strum(to_string = "balance-alb")]
    Alb,
}

impl BondMode {
    pub fn code(self) -> u8 {
        match self {
            Self::RoundRobin => 0,
            Self::ActiveBackup => 1,
            Self::Xor => 2,
            Self::Broadcast => 3,
            Self::Lacp => 4,
            Self::Tlb => 5,
            Self::Alb => 6,
        }
    }
}

impl TryFrom<u8> for BondMode {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::RoundRobin),
            1 => Ok(Self::ActiveBackup),
            2 => Ok(Self::Xor),
            3 => Ok(Self::Broadcast),
            4 => Ok(Self::Lacp),
            5 => Ok(Self::Tlb),
            6 => Ok(Self::Alb),
            other => Err(CoreError::ValidationFailed {
                field: "bond_mode".into(),
                reason: format!("expected 0-6, got {other}"),
            }),
        }
    }
}

impl From<BondMode> for u8 {
    fn from(mode: BondMode) -> Self {
        mode.code()
    }
}
