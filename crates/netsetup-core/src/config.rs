// ── Session configuration ──
//
// Runtime input for an `InterfaceCollection`. Built by the caller (usually
// from `netsetup-config`) and injected at construction; the core never
// reads files or the environment itself.

use serde::{Deserialize, Serialize};

/// Everything a configuration session needs to know up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hardware-detected interface names, in detection order.
    #[serde(default)]
    pub physical_interfaces: Vec<String>,
}

impl SessionConfig {
    pub fn with_physical<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            physical_interfaces: names.into_iter().map(Into::into).collect(),
        }
    }
}
