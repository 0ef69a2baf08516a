// ── Address entries ──
//
// Addresses are kept as the strings the user typed; the UI validates
// syntax, the model only carries them. On the wire an IPv4 entry is a
// `[address, netmask]` pair and an IPv6 entry an
// `[address, prefix, identifier]` triple.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One IPv4 address with its netmask.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Ip4Address {
    pub address: String,
    pub netmask: String,
}

impl Ip4Address {
    pub fn new(address: impl Into<String>, netmask: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            netmask: netmask.into(),
        }
    }

    /// Both halves filled in.
    pub fn is_complete(&self) -> bool {
        !self.address.is_empty() && !self.netmask.is_empty()
    }
}

impl From<(String, String)> for Ip4Address {
    fn from((address, netmask): (String, String)) -> Self {
        Self { address, netmask }
    }
}

impl From<Ip4Address> for (String, String) {
    fn from(a: Ip4Address) -> Self {
        (a.address, a.netmask)
    }
}

impl fmt::Display for Ip4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.netmask)
    }
}

/// One IPv6 address, its prefix length, and the identifier naming the
/// entry (`default` for the primary address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(
    from = "(String, String, String)",
    into = "(String, String, String)"
)]
pub struct Ip6Address {
    pub address: String,
    pub prefix: String,
    pub identifier: String,
}

impl Ip6Address {
    pub fn new(
        address: impl Into<String>,
        prefix: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            prefix: prefix.into(),
            identifier: identifier.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.address.is_empty() && !self.prefix.is_empty()
    }
}

impl From<(String, String, String)> for Ip6Address {
    fn from((address, prefix, identifier): (String, String, String)) -> Self {
        Self {
            address,
            prefix,
            identifier,
        }
    }
}

impl From<Ip6Address> for (String, String, String) {
    fn from(a: Ip6Address) -> Self {
        (a.address, a.prefix, a.identifier)
    }
}

impl fmt::Display for Ip6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}/{}", self.identifier, self.address, self.prefix)
    }
}
