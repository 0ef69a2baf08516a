//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netsetup_config::ConfigError;
use netsetup_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const INVALID: i32 = 7;
    pub const IO: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netsetup::not_found),
        help("Run: netsetup {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(
        code(netsetup::conflict),
        help("Use `netsetup interfaces put` to replace it, or pick another name.")
    )]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    #[error("Interface '{name}' is a member of '{owner}'")]
    #[diagnostic(
        code(netsetup::in_use),
        help("Remove it from {owner} first: netsetup interfaces get {owner}")
    )]
    InUse { name: String, owner: String },

    #[error("VLAN {vlan_id} on '{parent}' already exists as '{existing}'")]
    #[diagnostic(code(netsetup::duplicate_vlan))]
    DuplicateVlan {
        parent: String,
        vlan_id: u16,
        existing: String,
    },

    // ── Model rules ──────────────────────────────────────────────────
    #[error("Invalid topology for '{name}': {reason}")]
    #[diagnostic(
        code(netsetup::topology),
        help("Run: netsetup interfaces candidates {name} --type <TYPE> to see valid members")
    )]
    Topology { name: String, reason: String },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(netsetup::invalid))]
    Invalid { field: String, reason: String },

    // ── Usage ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netsetup::validation))]
    Validation { field: String, reason: String },

    #[error("No state file given")]
    #[diagnostic(
        code(netsetup::no_state_file),
        help(
            "Pass --state <FILE>, set NETSETUP_STATE, or set session.state_file in\n\
             the config file ({config_path})."
        )
    )]
    NoStateFile { config_path: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(netsetup::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(netsetup::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(netsetup::io))]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(netsetup::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(netsetup::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(netsetup::prompt))]
    Prompt(#[from] dialoguer::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::InUse { .. } | Self::DuplicateVlan { .. } => {
                exit_code::CONFLICT
            }
            Self::Topology { .. } | Self::Invalid { .. } | Self::Json(_) => exit_code::INVALID,
            Self::Validation { .. }
            | Self::NoStateFile { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Io(_) => exit_code::IO,
            Self::Config(_) | Self::Yaml(_) | Self::Prompt(_) => exit_code::GENERAL,
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "interface".into(),
            identifier: name.into(),
            list_command: "interfaces list --all".into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NameConflict { name } => CliError::Conflict {
                resource_type: "interface".into(),
                identifier: name,
            },
            CoreError::InterfaceNotFound { name } => CliError::not_found(name),
            CoreError::UnknownInterfaceType { value } => CliError::Invalid {
                field: "interfaceType".into(),
                reason: format!("unknown interface type '{value}'"),
            },
            CoreError::MalformedRecord { name, message } => CliError::Invalid {
                field: format!("record '{name}'"),
                reason: message,
            },
            CoreError::InterfaceInUse { name, owner } => CliError::InUse { name, owner },
            CoreError::InvalidTopology { name, reason } => CliError::Topology { name, reason },
            CoreError::DuplicateVlan {
                parent,
                vlan_id,
                existing,
            } => CliError::DuplicateVlan {
                parent,
                vlan_id,
                existing,
            },
            CoreError::ValidationFailed { field, reason } => CliError::Invalid { field, reason },
        }
    }
}
