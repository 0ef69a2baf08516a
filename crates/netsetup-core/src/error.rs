// ── Core error types ──
//
// Errors surfaced by the interface model. Mutations validate before they
// commit, so every variant here means "nothing changed".

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Naming ───────────────────────────────────────────────────────
    #[error("Interface already exists: {name}")]
    NameConflict { name: String },

    #[error("Interface not found: {name}")]
    InterfaceNotFound { name: String },

    // ── Wire records ─────────────────────────────────────────────────
    #[error("Unknown interface type: '{value}'")]
    UnknownInterfaceType { value: String },

    #[error("Malformed interface record '{name}': {message}")]
    MalformedRecord { name: String, message: String },

    // ── Topology ─────────────────────────────────────────────────────
    #[error("Interface {name} is in use by {owner}")]
    InterfaceInUse { name: String, owner: String },

    #[error("Invalid topology for {name}: {reason}")]
    InvalidTopology { name: String, reason: String },

    #[error("VLAN {vlan_id} on {parent} is already configured as {existing}")]
    DuplicateVlan {
        parent: String,
        vlan_id: u16,
        existing: String,
    },

    #[error("Validation failed: {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

impl CoreError {
    pub(crate) fn topology(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }

    /// Whether this is the recoverable naming-conflict signal.
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, Self::NameConflict { .. })
    }
}
