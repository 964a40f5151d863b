// ── Member and interface domain types ──

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Site role. Hubs terminate tunnels from every branch; branches only
/// terminate tunnels to hubs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Hub,
    Branch,
}

impl Role {
    /// The role a member of this role builds tunnels towards.
    pub fn peer_role(self) -> Self {
        match self {
            Self::Hub => Self::Branch,
            Self::Branch => Self::Hub,
        }
    }
}

/// Numeric member id, `1..=255`.
///
/// The id is consumed as the tunnel pool's third octet and as the prefix of
/// tunnel interface numbers, so zero is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MemberId(u8);

impl MemberId {
    pub fn new(raw: u8) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Synthetic BGP ASN: `65000 + id`.
    pub fn asn(self) -> u32 {
        65_000 + u32::from(self.0)
    }

    /// SD-WAN sub-interface number used towards this member: `id + 100`.
    pub fn sdwan_interface(self) -> u16 {
        u16::from(self.0) + 100
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interface family, derived from the key's naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    /// `wan*` -- private/MPLS transport.
    Wan,
    /// `isp*` -- internet transport.
    Isp,
    /// `lan*` -- internal segment.
    Lan,
    /// Anything else. Passed through unclassified.
    Other,
}

impl InterfaceKind {
    pub fn from_key(key: &str) -> Self {
        if key.starts_with("wan") {
            Self::Wan
        } else if key.starts_with("isp") {
            Self::Isp
        } else if key.starts_with("lan") {
            Self::Lan
        } else {
            Self::Other
        }
    }

    /// WAN and ISP interfaces carry tunnels; nothing else joins the mesh.
    pub fn is_transport(self) -> bool {
        matches!(self, Self::Wan | Self::Isp)
    }
}

/// A physical or logical port on a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub key: String,
    pub name: String,
    /// Interface address with prefix. `None` for L2 ports.
    pub address: Option<Ipv4Net>,
    pub l3: bool,
    #[serde(rename = "sdwan_gw")]
    pub gateway: Option<Ipv4Addr>,
    pub zone: Option<String>,
    pub sdwan_profile: Option<String>,
}

impl Interface {
    pub fn kind(&self) -> InterfaceKind {
        InterfaceKind::from_key(&self.key)
    }
}

/// One site/device in the topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: String,
    pub id: MemberId,
    pub role: Role,
    pub serial: String,
    /// Router id, doubles as the loopback address.
    pub router_id: Ipv4Addr,
    pub interfaces: BTreeMap<String, Interface>,
}

impl Member {
    /// WAN/ISP interfaces in key order.
    pub fn transport_interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values().filter(|i| i.kind().is_transport())
    }
}
