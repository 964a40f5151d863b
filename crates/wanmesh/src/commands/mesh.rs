//! Tunnel mesh command handler.

use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;

use wanmesh_core::{Assembly, TunnelEdge};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MeshRow {
    #[tabled(rename = "Spoke")]
    spoke: String,
    #[tabled(rename = "ID")]
    id: u8,
    #[tabled(rename = "ASN")]
    asn: u32,
    #[tabled(rename = "Hub")]
    hub: String,
    #[tabled(rename = "Hub If")]
    hub_interface: String,
    #[tabled(rename = "Spoke If")]
    spoke_interface: String,
    #[tabled(rename = "Hub Tunnel")]
    hub_ip: String,
    #[tabled(rename = "Spoke Tunnel")]
    spoke_ip: String,
}

/// One edge plus the spoke identity it is numbered against.
#[derive(Serialize)]
struct MeshEntry<'a> {
    spoke_id: u8,
    asn: u32,
    #[serde(flatten)]
    edge: &'a TunnelEdge,
}

impl From<&MeshEntry<'_>> for MeshRow {
    fn from(e: &MeshEntry<'_>) -> Self {
        Self {
            spoke: e.edge.spoke.clone(),
            id: e.spoke_id,
            asn: e.asn,
            hub: e.edge.hub.clone(),
            hub_interface: e.edge.hub_interface.clone(),
            spoke_interface: e.edge.spoke_interface.clone(),
            hub_ip: e.edge.hub_tunnel_ip.to_string(),
            spoke_ip: e.edge.spoke_tunnel_ip.to_string(),
        }
    }
}

fn edge_line(edge: &TunnelEdge) -> String {
    format!(
        "{} {} <-> {} {}: {} <-> {}",
        edge.hub,
        edge.hub_interface,
        edge.spoke,
        edge.spoke_interface,
        edge.hub_tunnel_ip.addr(),
        edge.spoke_tunnel_ip.addr()
    )
}

fn entries(assembly: &Assembly) -> Vec<MeshEntry<'_>> {
    assembly
        .mesh
        .edges()
        .iter()
        .filter_map(|edge| {
            let spoke = assembly.topology.member(&edge.spoke)?;
            Some(MeshEntry {
                spoke_id: spoke.id.get(),
                asn: spoke.id.asn(),
                edge,
            })
        })
        .collect()
}

/// Human-readable mesh summary grouped by spoke.
pub fn summary(assembly: &Assembly) -> String {
    let mut out = String::from("=== Tunnel Mesh Summary ===");
    for (spoke_name, edges) in assembly.mesh.by_spoke() {
        let Some(spoke) = assembly.topology.member(spoke_name) else {
            continue;
        };
        let _ = write!(
            out,
            "\n\n{spoke_name} (id={}, ASN={}):",
            spoke.id,
            spoke.id.asn()
        );
        for edge in edges {
            let _ = write!(out, "\n  {}", edge_line(edge));
        }
    }
    if assembly.mesh.is_empty() {
        out.push_str("\n\n(no tunnels)");
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::resolve(global)?;
    let assembly = util::assemble(&cfg.topology)?;
    let entries = entries(&assembly);

    let out = output::render_list(
        &global.output,
        &entries,
        |e| MeshRow::from(e),
        |e| edge_line(e.edge),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
