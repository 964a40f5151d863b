// ── Assembled per-device model ──
//
// The fully resolved structure handed to the renderer. Nothing here is
// recomputed downstream: addresses, zones and tunnel numbers are final.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use indexmap::IndexMap;
use ipnet::Ipv4Net;
use serde::Serialize;

use super::member::{Interface, MemberId, Role};
use super::topology::Profiles;

/// L3 route towards one of a remote's WAN subnets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRoute {
    /// Local egress interface name (not key).
    #[serde(rename = "intf")]
    pub interface: String,
    #[serde(rename = "gw")]
    pub gateway: Ipv4Addr,
}

/// One numbered tunnel interface on this device towards one remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunnelInterface {
    /// `tunnel.<N>`.
    #[serde(rename = "intf")]
    pub interface: String,
    /// Local tunnel address with mask.
    #[serde(rename = "ip")]
    pub tunnel_ip: Ipv4Net,
    pub monitor_ip: Ipv4Addr,
    /// Local physical egress interface name.
    #[serde(rename = "local_intf")]
    pub local_interface: String,
    /// Local physical address, mask kept for IKE gateway configuration.
    pub local_ip: Option<Ipv4Net>,
    /// Peer physical address, host only.
    pub peer_ip: Option<Ipv4Addr>,
}

/// Everything a device needs to know about one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRecord {
    pub id: MemberId,
    #[serde(rename = "sdwan_intf")]
    pub sdwan_interface: u16,
    pub loopback: Ipv4Addr,
    /// Destination subnet -> local egress.
    #[serde(rename = "remote_wans")]
    pub routes: BTreeMap<Ipv4Net, StaticRoute>,
    /// Tunnel name -> tunnel interface, in sequence order.
    pub tunnels: IndexMap<String, TunnelInterface>,
}

/// The final per-device artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceModel {
    pub name: String,
    #[serde(rename = "sn")]
    pub serial: String,
    pub id: MemberId,
    pub role: Role,
    pub template: String,
    pub loopback: Ipv4Addr,
    pub asn: u32,
    pub interfaces: BTreeMap<String, Interface>,
    pub remotes: BTreeMap<String, RemoteRecord>,
    pub profiles: Profiles,
}

impl DeviceModel {
    pub fn tunnel_count(&self) -> usize {
        self.remotes.values().map(|r| r.tunnels.len()).sum()
    }

    pub fn route_count(&self) -> usize {
        self.remotes.values().map(|r| r.routes.len()).sum()
    }
}
