// ── Tunnel edge: one hub-interface <-> spoke-interface pairing ──

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::Serialize;

/// One point-to-point tunnel between a hub WAN interface and a spoke WAN
/// interface. Produced once per mesh generation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunnelEdge {
    pub hub: String,
    pub spoke: String,
    pub hub_interface: String,
    pub spoke_interface: String,
    /// Hub-side tunnel address, /31.
    pub hub_tunnel_ip: Ipv4Net,
    /// Spoke-side tunnel address, /31.
    pub spoke_tunnel_ip: Ipv4Net,
    /// What the hub monitors: the spoke's tunnel address, host only.
    pub hub_monitor_ip: Ipv4Addr,
    /// What the spoke monitors: the hub's tunnel address, host only.
    pub spoke_monitor_ip: Ipv4Addr,
}

impl TunnelEdge {
    /// `(hub, spoke, hub interface, spoke interface)` -- unique per mesh.
    pub fn key(&self) -> (&str, &str, &str, &str) {
        (
            &self.hub,
            &self.spoke,
            &self.hub_interface,
            &self.spoke_interface,
        )
    }

    pub fn connects(&self, hub: &str, spoke: &str) -> bool {
        self.hub == hub && self.spoke == spoke
    }
}
