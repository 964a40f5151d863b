// ── Tunnel mesh generation ──
//
// Every hub WAN/ISP interface is paired with every spoke WAN/ISP interface,
// for every hub/spoke pair. Each pairing takes the next /31 from the spoke's
// block in the tunnel pool.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::CoreError;
use crate::model::{Member, Topology, TunnelEdge};
use crate::pool::EDGES_PER_SPOKE;

/// The full set of tunnel edges for one run, in generation order:
/// hub name, spoke name, hub interface key, spoke interface key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TunnelMesh {
    edges: Vec<TunnelEdge>,
}

impl TunnelMesh {
    pub fn edges(&self) -> &[TunnelEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges between one hub and one spoke, in generation order.
    pub fn between<'a>(
        &'a self,
        hub: &'a str,
        spoke: &'a str,
    ) -> impl Iterator<Item = &'a TunnelEdge> + 'a {
        self.edges.iter().filter(move |e| e.connects(hub, spoke))
    }

    /// Edges grouped by spoke name.
    pub fn by_spoke(&self) -> BTreeMap<&str, Vec<&TunnelEdge>> {
        let mut groups: BTreeMap<&str, Vec<&TunnelEdge>> = BTreeMap::new();
        for edge in &self.edges {
            groups.entry(edge.spoke.as_str()).or_default().push(edge);
        }
        groups
    }
}

impl<'a> IntoIterator for &'a TunnelMesh {
    type Item = &'a TunnelEdge;
    type IntoIter = std::slice::Iter<'a, TunnelEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Generate the tunnel mesh for a topology.
///
/// The offset counter belongs to the spoke and is shared by all hubs, so
/// edges from different hubs to the same spoke never reuse an address.
/// A member without WAN/ISP interfaces simply contributes no edges.
pub fn build_mesh(topology: &Topology) -> Result<TunnelMesh, CoreError> {
    let hubs: Vec<&Member> = topology.hubs().collect();
    let spokes: Vec<&Member> = topology.spokes().collect();

    check_capacity(&hubs, &spokes)?;

    let pool = topology.pool();
    let mut offsets: BTreeMap<&str, u32> = BTreeMap::new();
    let mut edges = Vec::new();

    for hub in &hubs {
        for spoke in &spokes {
            let offset = offsets.entry(spoke.name.as_str()).or_insert(0);

            for hub_if in hub.transport_interfaces() {
                for spoke_if in spoke.transport_interfaces() {
                    let pair = pool.allocate(spoke.id, *offset)?;
                    trace!(
                        hub = %hub.name,
                        spoke = %spoke.name,
                        hub_if = %hub_if.key,
                        spoke_if = %spoke_if.key,
                        offset = *offset,
                        "allocated tunnel subnet"
                    );

                    edges.push(TunnelEdge {
                        hub: hub.name.clone(),
                        spoke: spoke.name.clone(),
                        hub_interface: hub_if.key.clone(),
                        spoke_interface: spoke_if.key.clone(),
                        hub_tunnel_ip: pair.hub,
                        spoke_tunnel_ip: pair.spoke,
                        hub_monitor_ip: pair.spoke.addr(),
                        spoke_monitor_ip: pair.hub.addr(),
                    });
                    *offset += 2;
                }
            }
        }
    }

    debug!(
        hubs = hubs.len(),
        spokes = spokes.len(),
        edges = edges.len(),
        pool = %pool,
        "tunnel mesh generated"
    );
    Ok(TunnelMesh { edges })
}

/// Reject spokes that would need more /31s than their pool block holds.
fn check_capacity(hubs: &[&Member], spokes: &[&Member]) -> Result<(), CoreError> {
    let hub_ifs: usize = hubs.iter().map(|h| h.transport_interfaces().count()).sum();

    for spoke in spokes {
        let edges = hub_ifs * spoke.transport_interfaces().count();
        if edges > EDGES_PER_SPOKE {
            return Err(CoreError::PoolCapacityExceeded {
                spoke: spoke.name.clone(),
                edges,
                max: EDGES_PER_SPOKE,
            });
        }
    }
    Ok(())
}
