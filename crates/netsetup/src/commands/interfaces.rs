//! Interface command handlers.

use std::cell::RefCell;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::rc::Rc;

use serde_json::Value;
use tabled::Tabled;
use tracing::debug;

use netsetup_core::{
    BondMode, CollectionEvent, CommandResult, Device, DeviceKind, DeviceRecord,
    InterfaceCollection, InterfaceCommand, InterfaceType, Ip4Address, Ip6Address, create_device,
};

use crate::cli::{DeviceArgs, InterfacesArgs, InterfacesCommand, KindArg, ListArgs};
use crate::error::CliError;
use crate::output::{self, Painter};
use crate::state::Session;

use super::{Ctx, util};

impl From<KindArg> for InterfaceType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ethernet => Self::Ethernet,
            KindArg::Vlan => Self::Vlan,
            KindArg::Bridge => Self::Bridge,
            KindArg::Bond => Self::Bond,
        }
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Addressing")]
    addressing: String,
    #[tabled(rename = "Links")]
    links: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl InterfaceRow {
    fn new(device: &Device, interfaces: &InterfaceCollection) -> Self {
        Self {
            name: device.name.clone(),
            kind: device.interface_type().to_string(),
            addressing: addressing(device),
            links: links(device),
            status: status(device, interfaces),
        }
    }
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Candidates")]
    candidates: String,
}

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Configured")]
    configured: String,
}

fn addressing(device: &Device) -> String {
    let mut parts = Vec::new();
    if device.ip4dynamic {
        parts.push("DHCP".to_owned());
    } else {
        parts.extend(device.ip4.iter().filter(|a| a.is_complete()).map(ToString::to_string));
    }
    if device.ip6dynamic {
        parts.push("SLAAC".to_owned());
    } else {
        parts.extend(
            device
                .ip6
                .iter()
                .filter(|a| a.is_complete())
                .map(|a| format!("{}/{}", a.address, a.prefix)),
        );
    }
    util::join_or_dash(&parts)
}

fn links(device: &Device) -> String {
    match &device.kind {
        DeviceKind::Ethernet => "-".into(),
        DeviceKind::Vlan(cfg) => format!(
            "VLAN {} on {}",
            cfg.vlan_id.map_or_else(|| "?".to_owned(), |id| id.to_string()),
            cfg.parent_device.as_deref().unwrap_or("?")
        ),
        DeviceKind::Bond(_) | DeviceKind::Bridge(_) => util::join_or_dash(device.subdevice_names()),
    }
}

fn status(device: &Device, interfaces: &InterfaceCollection) -> String {
    if let Some(owner) = interfaces.owner(&device.name) {
        format!("member of {}", owner.name)
    } else if !interfaces.contains(&device.name) {
        "unconfigured".into()
    } else if interfaces.primary_interface() == Some(device.name.as_str()) {
        "primary".into()
    } else {
        "-".into()
    }
}

fn detail(device: &Device, interfaces: &InterfaceCollection, painter: Painter) -> String {
    let field = |label: &str, value: String| format!("{} {value}", painter.label(&format!("{label:<14}")));

    let state = if let Some(owner) = interfaces.owner(&device.name) {
        painter.notice(&format!("member of {}", owner.name))
    } else if interfaces.contains(&device.name) {
        painter.good("available")
    } else {
        painter.muted("unconfigured hardware")
    };

    let mut lines = vec![
        field("Name:", device.name.clone()),
        field("Type:", device.interface_type().to_string()),
        field("Status:", state),
        field("Start at boot:", if device.start { "yes" } else { "no" }.into()),
    ];
    if interfaces.primary_interface() == Some(device.name.as_str()) {
        lines.push(field("Primary:", painter.good("yes")));
    }

    match &device.kind {
        DeviceKind::Ethernet => {}
        DeviceKind::Vlan(cfg) => {
            lines.push(field(
                "VLAN ID:",
                cfg.vlan_id.map_or_else(|| "-".into(), |id| id.to_string()),
            ));
            lines.push(field("Parent:", cfg.parent_device.clone().unwrap_or_else(|| "-".into())));
        }
        DeviceKind::Bond(cfg) => {
            lines.push(field("Slaves:", util::join_or_dash(&cfg.slaves)));
            lines.push(field(
                "Mode:",
                cfg.mode
                    .map_or_else(|| "-".into(), |m| format!("{m} ({})", m.code())),
            ));
            if !cfg.primary.is_empty() {
                lines.push(field("Preferred:", cfg.primary.join(", ")));
            }
            if let Some(ms) = cfg.miimon {
                lines.push(field("MII monitor:", format!("{ms} ms")));
            }
        }
        DeviceKind::Bridge(cfg) => {
            lines.push(field("Ports:", util::join_or_dash(&cfg.ports)));
            lines.push(field("Forward delay:", format!("{} s", cfg.forward_delay)));
        }
    }

    let ip4 = if device.ip4dynamic {
        "DHCP".to_owned()
    } else {
        let list: Vec<String> = device.ip4.iter().map(ToString::to_string).collect();
        util::join_or_dash(&list)
    };
    let ip6 = if device.ip6dynamic {
        "SLAAC".to_owned()
    } else {
        let list: Vec<String> = device.ip6.iter().map(ToString::to_string).collect();
        util::join_or_dash(&list)
    };
    lines.push(field("IPv4:", ip4));
    lines.push(field("IPv6:", ip6));
    if !device.options.is_empty() {
        lines.push(field("Options:", device.options.join("; ")));
    }
    if let Some(saved) = interfaces.cached_configuration(&device.name) {
        lines.push(field("Saved config:", painter.muted(&saved.configuration_description())));
    }
    lines.push(field("Summary:", device.configuration_description()));

    lines.join("\n")
}

// ── Argument parsing ────────────────────────────────────────────────

fn invalid(field: &str, reason: String) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason,
    }
}

fn parse_ip4(spec: &str) -> Result<Ip4Address, CliError> {
    let Some((address, netmask)) = spec.split_once('/') else {
        return Err(invalid("--ip4", format!("expected ADDR/MASK, got '{spec}'")));
    };
    address
        .parse::<Ipv4Addr>()
        .map_err(|e| invalid("--ip4", format!("'{address}': {e}")))?;
    let mask_ok = netmask.parse::<Ipv4Addr>().is_ok()
        || netmask.parse::<u8>().is_ok_and(|bits| bits <= 32);
    if !mask_ok {
        return Err(invalid("--ip4", format!("'{netmask}' is not a netmask")));
    }
    Ok(Ip4Address::new(address, netmask))
}

fn parse_ip6(spec: &str, index: usize) -> Result<Ip6Address, CliError> {
    let mut parts = spec.splitn(3, '/');
    let address = parts.next().unwrap_or_default();
    let Some(prefix) = parts.next() else {
        return Err(invalid("--ip6", format!("expected ADDR/PREFIX[/ID], got '{spec}'")));
    };
    address
        .parse::<Ipv6Addr>()
        .map_err(|e| invalid("--ip6", format!("'{address}': {e}")))?;
    if !prefix.parse::<u8>().is_ok_and(|bits| bits <= 128) {
        return Err(invalid("--ip6", format!("'{prefix}' is not a prefix length")));
    }
    let identifier = match parts.next() {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ if index == 0 => "default".to_owned(),
        _ => format!("addr{index}"),
    };
    Ok(Ip6Address::new(address, prefix, identifier))
}

fn reject_flags(ty: InterfaceType, flags: &[(&str, bool)]) -> Result<(), CliError> {
    if let Some((flag, _)) = flags.iter().find(|(_, set)| *set) {
        return Err(invalid(flag, format!("not applicable to {ty} interfaces")));
    }
    Ok(())
}

/// Build a typed device from the per-field flags.
fn build_device(args: DeviceArgs) -> Result<Device, CliError> {
    let Some(kind) = args.kind else {
        return Err(invalid("--type", "required unless --from-file is given".into()));
    };
    let ty = InterfaceType::from(kind);

    let vlan_flags = [
        ("--vlan-id", args.vlan_id.is_some()),
        ("--parent", args.parent.is_some()),
    ];
    let member_flags = [("--member", !args.members.is_empty())];
    let bond_flags = [
        ("--bond-mode", args.bond_mode.is_some()),
        ("--bond-primary", !args.bond_primary.is_empty()),
        ("--miimon", args.miimon.is_some()),
    ];
    let bridge_flags = [("--bridge-fd", args.bridge_fd.is_some())];

    let mut device = Device::with_type(args.name, ty);
    device.ip4 = args.ip4.iter().map(|s| parse_ip4(s)).collect::<Result<_, _>>()?;
    device.ip6 = args
        .ip6
        .iter()
        .enumerate()
        .map(|(i, s)| parse_ip6(s, i))
        .collect::<Result<_, _>>()?;
    device.ip4dynamic = args.dhcp;
    device.ip6dynamic = args.slaac;
    device.start = args.start;
    device.options = args.options;

    match &mut device.kind {
        DeviceKind::Ethernet => {
            reject_flags(ty, &[&vlan_flags[..], &member_flags, &bond_flags, &bridge_flags].concat())?;
        }
        DeviceKind::Vlan(cfg) => {
            reject_flags(ty, &[&member_flags[..], &bond_flags, &bridge_flags].concat())?;
            cfg.vlan_id = args.vlan_id;
            cfg.parent_device = args.parent;
        }
        DeviceKind::Bond(cfg) => {
            reject_flags(ty, &[&vlan_flags[..], &bridge_flags].concat())?;
            cfg.slaves = args.members;
            cfg.primary = args.bond_primary;
            cfg.mode = args.bond_mode.map(BondMode::try_from).transpose()?;
            cfg.miimon = args.miimon;
        }
        DeviceKind::Bridge(cfg) => {
            reject_flags(ty, &[&vlan_flags[..], &bond_flags].concat())?;
            cfg.ports = args.members;
            if let Some(fd) = args.bridge_fd {
                cfg.forward_delay = fd;
            }
        }
    }

    Ok(device)
}

/// Read a record file, filling in the name from the command line.
fn named_record(path: &Path, name: &str) -> Result<DeviceRecord, CliError> {
    let mut record = util::read_record_file(path)?;
    let given = ["name", "interface"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .filter(|n| !n.is_empty())
        .map(str::to_owned);

    match given {
        Some(given) if given != name => Err(invalid(
            "--from-file",
            format!("record is named '{given}', not '{name}'"),
        )),
        Some(_) => Ok(record),
        None => {
            record.insert("name".into(), Value::String(name.to_owned()));
            Ok(record)
        }
    }
}

// ── Mutations ───────────────────────────────────────────────────────

fn headline(result: &CommandResult, verb: &str) -> String {
    match result {
        CommandResult::Stored { name } => format!("{verb} interface '{name}'"),
        CommandResult::Removed(device) => format!("Removed interface '{}'", device.name),
        CommandResult::Renamed { from, to } => format!("Renamed '{from}' to '{to}'"),
        CommandResult::PrimaryChanged { primary } => {
            format!("Primary interface: {}", primary.as_deref().unwrap_or("none"))
        }
    }
}

/// Follow-on changes to other interfaces, one line each. A restore that
/// brought back no addressing is not worth a line.
fn side_effects(
    events: &[CollectionEvent],
    subject: Option<&str>,
    interfaces: &InterfaceCollection,
    painter: Painter,
) -> Vec<String> {
    events
        .iter()
        .filter(|event| event.name().is_some() && event.name() != subject)
        .filter_map(|event| match event {
            CollectionEvent::Added { name, .. } => {
                Some(format!("  {name}: {}", painter.muted("created as member")))
            }
            CollectionEvent::AddressingCleared { name } => Some(format!(
                "  {name}: {}",
                painter.notice("standalone addressing cleared")
            )),
            CollectionEvent::AddressingRestored { name } => interfaces
                .get_interface(name)
                .is_some_and(Device::has_addressing)
                .then(|| format!("  {name}: {}", painter.good("addressing restored"))),
            _ => None,
        })
        .collect()
}

/// Execute one command, save the state and report what changed.
fn apply(
    session: &mut Session,
    ctx: &Ctx<'_>,
    command: InterfaceCommand,
    verb: &str,
) -> Result<(), CliError> {
    session.require_state_file()?;

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let subscription = session
        .interfaces
        .subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let result = session.interfaces.execute(command)?;
    let path = session.save()?;
    subscription.unsubscribe();
    debug!(path = %path.display(), version = session.interfaces.version(), "interfaces saved");

    let subject = match &result {
        CommandResult::Stored { name } | CommandResult::Renamed { to: name, .. } => Some(name.as_str()),
        CommandResult::Removed(device) => Some(device.name.as_str()),
        CommandResult::PrimaryChanged { .. } => None,
    };
    let mut lines = vec![headline(&result, verb)];
    lines.extend(side_effects(
        &events.borrow(),
        subject,
        &session.interfaces,
        ctx.painter,
    ));
    output::print_output(&lines.join("\n"), ctx.global.quiet);
    Ok(())
}

fn store(session: &mut Session, ctx: &Ctx<'_>, args: DeviceArgs, replace: bool) -> Result<(), CliError> {
    let command = match (args.from_file.clone(), replace) {
        (Some(path), true) => InterfaceCommand::PutObject(named_record(&path, &args.name)?),
        (Some(path), false) => {
            InterfaceCommand::Add(create_device(&named_record(&path, &args.name)?)?)
        }
        (None, true) => InterfaceCommand::Put(build_device(args)?),
        (None, false) => InterfaceCommand::Add(build_device(args)?),
    };
    apply(session, ctx, command, if replace { "Stored" } else { "Added" })
}

// ── Queries ─────────────────────────────────────────────────────────

fn list(session: &Session, ctx: &Ctx<'_>, args: &ListArgs) -> Result<(), CliError> {
    let interfaces = &session.interfaces;
    let devices: Vec<Device> = if args.used {
        interfaces.used_interfaces()
    } else if args.unused {
        interfaces.unused_interfaces()
    } else if args.all {
        interfaces.known_interfaces()
    } else {
        interfaces.all_interfaces().cloned().collect()
    };

    let out = output::render_list(
        ctx.format,
        &devices,
        |d| InterfaceRow::new(d, interfaces),
        |d| d.name.clone(),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

fn lookup(interfaces: &InterfaceCollection, name: &str) -> Result<Device, CliError> {
    interfaces
        .get_interface(name)
        .cloned()
        .or_else(|| {
            interfaces
                .physical_interfaces()
                .into_iter()
                .find(|d| d.name == name)
        })
        .ok_or_else(|| CliError::not_found(name))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(session: &mut Session, args: InterfacesArgs, ctx: &Ctx<'_>) -> Result<(), CliError> {
    match args.command {
        InterfacesCommand::List(list_args) => list(session, ctx, &list_args),

        InterfacesCommand::Get { name } => {
            let interfaces = &session.interfaces;
            let device = lookup(interfaces, &name)?;
            let out = output::render_single(
                ctx.format,
                &device,
                |d| detail(d, interfaces, ctx.painter),
                |d| d.configuration_description(),
            )?;
            output::print_output(&out, ctx.global.quiet);
            Ok(())
        }

        InterfacesCommand::Add(device_args) => store(session, ctx, device_args, false),
        InterfacesCommand::Put(device_args) => store(session, ctx, device_args, true),

        InterfacesCommand::Remove { name } => {
            session.require_state_file()?;
            if !session.interfaces.contains(&name) {
                return Err(CliError::not_found(name));
            }
            if let Some(owner) = session.interfaces.owner(&name) {
                return Err(CliError::InUse {
                    name,
                    owner: owner.name.clone(),
                });
            }
            let members = session
                .interfaces
                .get_interface(&name)
                .map_or(0, |d| d.subdevice_names().len());
            let prompt = if members > 0 {
                format!("Remove interface '{name}' and release its {members} member(s)?")
            } else {
                format!("Remove interface '{name}'?")
            };
            if !util::confirm("interfaces remove", &prompt, ctx.global.yes)? {
                output::print_output("Aborted.", ctx.global.quiet);
                return Ok(());
            }
            apply(session, ctx, InterfaceCommand::Remove { name }, "Removed")
        }

        InterfacesCommand::Rename { old, new } => apply(
            session,
            ctx,
            InterfaceCommand::Rename { from: old, to: new },
            "Renamed",
        ),

        InterfacesCommand::Primary { name, clear } => {
            let name = if clear { None } else { name };
            apply(session, ctx, InterfaceCommand::SetPrimary { name }, "Selected")
        }

        InterfacesCommand::Types { name } => {
            let interfaces = &session.interfaces;
            let types = interfaces.possible_types(&name);
            let out = output::render_list(
                ctx.format,
                &types,
                |ty| TypeRow {
                    kind: ty.to_string(),
                    candidates: util::join_or_dash(&interfaces.candidates(&name, *ty)),
                },
                ToString::to_string,
            )?;
            output::print_output(&out, ctx.global.quiet);
            Ok(())
        }

        InterfacesCommand::Candidates { name, kind } => {
            let interfaces = &session.interfaces;
            let names = interfaces.candidates(&name, kind.into());
            let out = output::render_list(
                ctx.format,
                &names,
                |n| CandidateRow {
                    name: n.clone(),
                    configured: if interfaces.contains(n) { "yes" } else { "no" }.into(),
                },
                Clone::clone,
            )?;
            output::print_output(&out, ctx.global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(name: &str, kind: KindArg) -> DeviceArgs {
        DeviceArgs {
            name: name.into(),
            kind: Some(kind),
            ip4: Vec::new(),
            ip6: Vec::new(),
            dhcp: false,
            slaac: false,
            start: false,
            options: Vec::new(),
            vlan_id: None,
            parent: None,
            members: Vec::new(),
            bond_mode: None,
            bond_primary: Vec::new(),
            miimon: None,
            bridge_fd: None,
            from_file: None,
        }
    }

    #[test]
    fn addresses_are_checked_for_syntax() {
        assert_eq!(
            parse_ip4("192.0.2.1/255.255.255.0").unwrap(),
            Ip4Address::new("192.0.2.1", "255.255.255.0")
        );
        assert_eq!(parse_ip4("192.0.2.1/24").unwrap().netmask, "24");
        assert!(parse_ip4("192.0.2.1").is_err());
        assert!(parse_ip4("192.0.2.300/24").is_err());
        assert!(parse_ip4("192.0.2.1/33").is_err());

        let first = parse_ip6("2001:db8::1/64", 0).unwrap();
        assert_eq!(first, Ip6Address::new("2001:db8::1", "64", "default"));
        assert_eq!(parse_ip6("2001:db8::2/64", 1).unwrap().identifier, "addr1");
        assert_eq!(parse_ip6("2001:db8::3/64/lan", 2).unwrap().identifier, "lan");
        assert!(parse_ip6("2001:db8::1/129", 0).is_err());
    }

    #[test]
    fn bond_flags_fill_the_bond_config() {
        let mut a = args("bond0", KindArg::Bond);
        a.members = vec!["eth0".into(), "eth1".into()];
        a.bond_mode = Some(4);
        a.miimon = Some(100);
        a.dhcp = true;

        let device = build_device(a).unwrap();
        let DeviceKind::Bond(cfg) = &device.kind else {
            panic!("expected a bond");
        };
        assert_eq!(cfg.slaves, ["eth0", "eth1"]);
        assert_eq!(cfg.mode, Some(BondMode::Lacp));
        assert_eq!(cfg.miimon, Some(100));
        assert!(device.ip4dynamic);
    }

    #[test]
    fn flags_of_other_kinds_are_rejected() {
        let mut a = args("eth0", KindArg::Ethernet);
        a.members = vec!["eth1".into()];
        assert!(matches!(
            build_device(a),
            Err(CliError::Validation { field, .. }) if field == "--member"
        ));

        let mut a = args("eth0.5", KindArg::Vlan);
        a.bridge_fd = Some(2);
        assert!(build_device(a).is_err());

        let mut a = args("bond0", KindArg::Bond);
        a.bond_mode = Some(9);
        assert!(matches!(build_device(a), Err(CliError::Invalid { .. })));
    }

    #[test]
    fn rows_describe_membership() {
        let mut interfaces = InterfaceCollection::new(netsetup_core::SessionConfig::with_physical([
            "eth0", "eth1",
        ]));
        interfaces.add(Device::bond("bond0", ["eth0"]).with_dhcp()).unwrap();
        interfaces.run_pending_effects();

        let eth0 = interfaces.get_interface("eth0").unwrap();
        assert_eq!(InterfaceRow::new(eth0, &interfaces).status, "member of bond0");

        let bond0 = interfaces.get_interface("bond0").unwrap();
        let row = InterfaceRow::new(bond0, &interfaces);
        assert_eq!(row.links, "eth0");
        assert_eq!(row.addressing, "DHCP");

        let eth1 = Device::ethernet("eth1");
        assert_eq!(InterfaceRow::new(&eth1, &interfaces).status, "unconfigured");
    }

    #[test]
    fn side_effects_skip_the_subject() {
        let events = vec![
            CollectionEvent::Added {
                name: "bond0".into(),
                index: 1,
            },
            CollectionEvent::Added {
                name: "eth1".into(),
                index: 2,
            },
            CollectionEvent::AddressingCleared { name: "eth0".into() },
            CollectionEvent::PrimaryChanged { primary: None },
        ];
        let interfaces = InterfaceCollection::new(netsetup_core::SessionConfig::default());
        let lines = side_effects(
            &events,
            Some("bond0"),
            &interfaces,
            Painter::new(crate::cli::ColorMode::Never),
        );
        assert_eq!(
            lines,
            [
                "  eth1: created as member",
                "  eth0: standalone addressing cleared"
            ]
        );
    }

    #[test]
    fn empty_restores_are_not_reported() {
        let mut interfaces = InterfaceCollection::new(netsetup_core::SessionConfig::with_physical([
            "eth0", "eth1",
        ]));
        interfaces
            .add(Device::ethernet("eth0").with_ip4("192.0.2.1", "255.255.255.0"))
            .unwrap();
        interfaces.add(Device::bond("bond0", ["eth0", "eth1"])).unwrap();
        interfaces.run_pending_effects();
        interfaces.remove("bond0").unwrap();
        interfaces.run_pending_effects();

        let events = vec![
            CollectionEvent::AddressingRestored { name: "eth0".into() },
            CollectionEvent::AddressingRestored { name: "eth1".into() },
        ];
        let lines = side_effects(
            &events,
            Some("bond0"),
            &interfaces,
            Painter::new(crate::cli::ColorMode::Never),
        );
        assert_eq!(lines, ["  eth0: addressing restored"]);
    }
}
