// ── Configuration summary ──
//
// The overview shown before the configuration is submitted. Members of a
// composite carry no addressing of their own and are listed with their
// owner instead.

use std::fmt;

use serde::Serialize;

use crate::store::InterfaceCollection;

/// Human-readable overview of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    /// Interfaces using IPv6 autoconfiguration.
    pub slaac: Vec<String>,
    pub members: Vec<String>,
    pub primary: Option<String>,
}

impl InterfaceCollection {
    pub fn summary(&self) -> NetworkSummary {
        let mut summary = NetworkSummary {
            primary: self.primary_interface().map(str::to_owned),
            ..NetworkSummary::default()
        };

        for device in self.all_interfaces() {
            let name = &device.name;

            if let Some(owner) = self.owner(name) {
                summary
                    .members
                    .push(format!("{name}: member of {}", owner.name));
                continue;
            }

            if device.ip4dynamic {
                summary.ipv4.push(format!("{name}: Dynamic (DHCP)"));
            } else {
                summary.ipv4.extend(
                    device
                        .ip4
                        .iter()
                        .filter(|a| a.is_complete())
                        .map(|a| format!("{name}: {a}")),
                );
            }

            if device.ip6dynamic {
                summary
                    .ipv6
                    .push(format!("{name}: Autoconfiguration (SLAAC)"));
                summary.slaac.push(name.clone());
            } else {
                summary.ipv6.extend(
                    device
                        .ip6
                        .iter()
                        .filter(|a| a.is_complete())
                        .map(|a| format!("{name}: {a}")),
                );
            }
        }

        summary
    }
}

impl fmt::Display for NetworkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_section(f, "IPv4 addresses", &self.ipv4)?;
        write_section(f, "IPv6 addresses", &self.ipv6)?;
        if !self.slaac.is_empty() {
            writeln!(f, "IPv6 autoconfiguration: {}", self.slaac.join(", "))?;
        }
        write_section(f, "Members", &self.members)?;
        write!(
            f,
            "Primary interface: {}",
            self.primary.as_deref().unwrap_or("none")
        )
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, lines: &[String]) -> fmt::Result {
    if lines.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title}:")?;
    for line in lines {
        writeln!(f, "  {line}")?;
    }
    Ok(())
}
