//! Clap derive structures for the `netsetup` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs` for man page generation, so it may only
//! depend on clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netsetup -- edit an appliance's network interface configuration
#[derive(Debug, Parser)]
#[command(
    name = "netsetup",
    version,
    about = "Edit appliance network interface configuration",
    long_about = "Edit the network interface configuration of an appliance setup session.\n\n\
        Ethernet, VLAN, Bond and Bridge interfaces are kept consistent while\n\
        you edit: members of a bond or bridge give up their own addressing and\n\
        get it back when they are released.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Session state file (JSON)
    #[arg(long, env = "NETSETUP_STATE", global = true)]
    pub state: Option<PathBuf>,

    /// Hardware-detected interfaces, comma separated (overrides state file and config)
    #[arg(long, value_delimiter = ',', global = true)]
    pub physical: Option<Vec<String>>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Interface kind as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(alias = "eth")]
    Ethernet,
    Vlan,
    #[value(alias = "br")]
    Bridge,
    Bond,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage network interfaces
    #[command(alias = "if", alias = "i")]
    Interfaces(InterfacesArgs),

    /// Show the configuration summary
    Summary,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Interfaces ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    #[command(subcommand)]
    pub command: InterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfacesCommand {
    /// List interfaces
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one interface
    Get {
        /// Interface name
        name: String,
    },

    /// Add a new interface (fails if the name exists)
    Add(DeviceArgs),

    /// Add or replace an interface
    Put(DeviceArgs),

    /// Remove an interface, releasing its members
    #[command(alias = "rm")]
    Remove {
        /// Interface name
        name: String,
    },

    /// Rename an interface
    #[command(alias = "mv")]
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Select the primary interface
    Primary {
        /// Interface name
        #[arg(required_unless_present = "clear")]
        name: Option<String>,

        /// Clear the selection instead
        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },

    /// Interface kinds that can be created under a name
    Types {
        /// Candidate interface name
        name: String,
    },

    /// Candidate members or parents for an interface of a kind
    Candidates {
        /// Interface being created or edited
        name: String,

        /// Interface kind
        #[arg(long = "type", short = 't', value_enum)]
        kind: KindArg,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only interfaces in use as bond/bridge members (incl. unconfigured hardware)
    #[arg(long, conflicts_with_all = ["unused", "all"])]
    pub used: bool,

    /// Only interfaces free for use (incl. unconfigured hardware)
    #[arg(long, conflicts_with = "all")]
    pub unused: bool,

    /// Configured interfaces plus unconfigured hardware
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Interface name
    pub name: String,

    /// Interface kind
    #[arg(long = "type", short = 't', value_enum, required_unless_present = "from_file")]
    pub kind: Option<KindArg>,

    /// Static IPv4 address, ADDR/NETMASK (repeatable)
    #[arg(long = "ip4", value_name = "ADDR/MASK")]
    pub ip4: Vec<String>,

    /// Static IPv6 address, ADDR/PREFIX[/IDENTIFIER] (repeatable)
    #[arg(long = "ip6", value_name = "ADDR/PREFIX[/ID]")]
    pub ip6: Vec<String>,

    /// Obtain IPv4 via DHCP
    #[arg(long)]
    pub dhcp: bool,

    /// Use IPv6 autoconfiguration (SLAAC)
    #[arg(long)]
    pub slaac: bool,

    /// Bring the interface up at boot
    #[arg(long)]
    pub start: bool,

    /// Free-form interface option (repeatable)
    #[arg(long = "option")]
    pub options: Vec<String>,

    /// VLAN id (1-4096)
    #[arg(long)]
    pub vlan_id: Option<u16>,

    /// VLAN parent interface
    #[arg(long)]
    pub parent: Option<String>,

    /// Bond slave or bridge port (repeatable, comma separated)
    #[arg(long = "member", short = 'm', value_delimiter = ',')]
    pub members: Vec<String>,

    /// Bonding mode (0-6)
    #[arg(long)]
    pub bond_mode: Option<u8>,

    /// Preferred bond slave (repeatable)
    #[arg(long)]
    pub bond_primary: Vec<String>,

    /// Bond link monitoring interval in milliseconds
    #[arg(long)]
    pub miimon: Option<u32>,

    /// Bridge forwarding delay in seconds
    #[arg(long)]
    pub bridge_fd: Option<u32>,

    /// Read the interface record from a JSON file
    #[arg(
        long,
        short = 'F',
        conflicts_with_all = [
            "kind", "ip4", "ip6", "dhcp", "slaac", "start", "options", "vlan_id",
            "parent", "members", "bond_mode", "bond_primary", "miimon", "bridge_fd",
        ]
    )]
    pub from_file: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with defaults
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
