// ── Per-device model assembly ──
//
// Turns the classified topology plus the tunnel mesh into one DeviceModel
// per member: its remotes, the static routes towards each remote's WAN
// subnets, and one numbered tunnel interface per mesh edge.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use indexmap::IndexMap;
use ipnet::Ipv4Net;
use tracing::{debug, info};

use crate::classify::{ClassificationWarning, classify_topology};
use crate::error::CoreError;
use crate::mesh::{TunnelMesh, build_mesh};
use crate::model::{
    DeviceModel, Interface, Member, MemberId, RemoteRecord, Role, StaticRoute, Topology,
    TunnelEdge, TunnelInterface,
};

/// Width of the per-remote sequence field in a tunnel number.
pub const TUNNEL_SEQUENCE_DIGITS: u32 = 2;

/// Widest tunnel number the target platform accepts (`tunnel.1`..`tunnel.9999`).
pub const TUNNEL_NUMBER_DIGITS: u32 = 4;

/// Compose a tunnel interface number: remote id followed by the two-digit,
/// zero-padded sequence. `(5, 0)` -> `500`, `(12, 7)` -> `1207`.
///
/// Returns `None` when the sequence exceeds two digits or the result
/// exceeds four, i.e. for remote ids of 100 and above.
pub fn tunnel_number(remote_id: MemberId, sequence: usize) -> Option<u32> {
    let field = 10u32.pow(TUNNEL_SEQUENCE_DIGITS);
    let max = 10u32.pow(TUNNEL_NUMBER_DIGITS) - 1;

    let sequence = u32::try_from(sequence).ok().filter(|s| *s < field)?;
    let number = u32::from(remote_id.get()) * field + sequence;
    (number <= max).then_some(number)
}

/// Assemble the model for one member of an already classified topology.
pub fn assemble(
    member: &Member,
    topology: &Topology,
    mesh: &TunnelMesh,
) -> Result<DeviceModel, CoreError> {
    let mut remotes = BTreeMap::new();

    for remote in topology.members_with_role(member.role.peer_role()) {
        let record = RemoteRecord {
            id: remote.id,
            sdwan_interface: remote.id.sdwan_interface(),
            loopback: remote.router_id,
            routes: static_routes(member, remote),
            tunnels: tunnel_interfaces(member, remote, mesh)?,
        };
        remotes.insert(remote.name.clone(), record);
    }

    Ok(DeviceModel {
        name: member.name.clone(),
        serial: member.serial.clone(),
        id: member.id,
        role: member.role,
        template: member.name.clone(),
        loopback: member.router_id,
        asn: member.id.asn(),
        interfaces: member.interfaces.clone(),
        remotes,
        profiles: topology.profiles().clone(),
    })
}

/// Routes to each of the remote's L3 subnets via the same-keyed local
/// interface. Anything without an address, a local counterpart, or a local
/// gateway is skipped.
fn static_routes(local: &Member, remote: &Member) -> BTreeMap<Ipv4Net, StaticRoute> {
    let mut routes = BTreeMap::new();

    for (key, remote_if) in &remote.interfaces {
        if !remote_if.l3 {
            continue;
        }
        let Some(address) = remote_if.address else {
            debug!(remote = %remote.name, interface = %key, "no address, skipping route");
            continue;
        };
        let Some(local_if) = local.interfaces.get(key) else {
            debug!(local = %local.name, interface = %key, "no local counterpart, skipping route");
            continue;
        };
        let Some(gateway) = local_if.gateway else {
            debug!(local = %local.name, interface = %key, "no local gateway, skipping route");
            continue;
        };

        routes.insert(
            address.trunc(),
            StaticRoute {
                interface: local_if.name.clone(),
                gateway,
            },
        );
    }
    routes
}

/// One tunnel interface per mesh edge between `local` and `remote`,
/// numbered in mesh order.
fn tunnel_interfaces(
    local: &Member,
    remote: &Member,
    mesh: &TunnelMesh,
) -> Result<IndexMap<String, TunnelInterface>, CoreError> {
    let edges: Vec<&TunnelEdge> = match local.role {
        Role::Hub => mesh.between(&local.name, &remote.name).collect(),
        Role::Branch => mesh.between(&remote.name, &local.name).collect(),
    };

    let mut tunnels = IndexMap::with_capacity(edges.len());
    for (sequence, edge) in edges.into_iter().enumerate() {
        let number =
            tunnel_number(remote.id, sequence).ok_or_else(|| CoreError::TunnelNumberOverflow {
                remote: remote.name.clone(),
                remote_id: remote.id.get(),
                sequence,
                digits: TUNNEL_NUMBER_DIGITS,
            })?;

        let side = Side::of(local.role, edge);
        let local_if = interface(local, side.local_key)?;
        let remote_if = interface(remote, side.remote_key)?;

        tunnels.insert(
            format!("{}_{}_{}", remote.name, side.local_key, side.remote_key),
            TunnelInterface {
                interface: format!("tunnel.{number}"),
                tunnel_ip: side.tunnel_ip,
                monitor_ip: side.monitor_ip,
                local_interface: local_if.name.clone(),
                local_ip: local_if.address,
                peer_ip: remote_if.address.map(|a| a.addr()),
            },
        );
    }
    Ok(tunnels)
}

/// An edge seen from one end.
struct Side<'a> {
    local_key: &'a str,
    remote_key: &'a str,
    tunnel_ip: Ipv4Net,
    monitor_ip: Ipv4Addr,
}

impl<'a> Side<'a> {
    fn of(role: Role, edge: &'a TunnelEdge) -> Self {
        match role {
            Role::Hub => Self {
                local_key: &edge.hub_interface,
                remote_key: &edge.spoke_interface,
                tunnel_ip: edge.hub_tunnel_ip,
                monitor_ip: edge.hub_monitor_ip,
            },
            Role::Branch => Self {
                local_key: &edge.spoke_interface,
                remote_key: &edge.hub_interface,
                tunnel_ip: edge.spoke_tunnel_ip,
                monitor_ip: edge.spoke_monitor_ip,
            },
        }
    }
}

fn interface<'m>(member: &'m Member, key: &str) -> Result<&'m Interface, CoreError> {
    member
        .interfaces
        .get(key)
        .ok_or_else(|| CoreError::InterfaceNotFound {
            member: member.name.clone(),
            interface: key.to_owned(),
        })
}

// ── Whole-run assembly ───────────────────────────────────────────────

/// Everything one generation run produces. Either every device is
/// assembled or the run fails; there is no partial set.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub topology: Topology,
    pub mesh: TunnelMesh,
    pub devices: BTreeMap<String, DeviceModel>,
    pub warnings: Vec<ClassificationWarning>,
}

impl Assembly {
    pub fn device(&self, name: &str) -> Option<&DeviceModel> {
        self.devices.get(name)
    }
}

/// Classify, build the mesh, and assemble every member.
pub fn assemble_all(topology: &Topology) -> Result<Assembly, CoreError> {
    let (classified, warnings) = classify_topology(topology);
    let mesh = build_mesh(&classified)?;

    let devices = classified
        .members()
        .map(|member| Ok((member.name.clone(), assemble(member, &classified, &mesh)?)))
        .collect::<Result<BTreeMap<_, _>, CoreError>>()?;

    info!(
        devices = devices.len(),
        tunnels = mesh.len(),
        warnings = warnings.len(),
        "device models assembled"
    );

    Ok(Assembly {
        topology: classified,
        mesh,
        devices,
        warnings,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fixtures::{TopologyBuilder, port, routed};

    fn id(raw: u8) -> MemberId {
        MemberId::new(raw).unwrap()
    }

    fn scenario() -> Topology {
        TopologyBuilder::new()
            .profile("ISP1")
            .member(
                "hub1",
                1,
                Role::Hub,
                vec![
                    routed("isp1", "203.0.113.2/30", Some("203.0.113.1")),
                    routed("isp2", "198.51.100.2/30", Some("198.51.100.1")),
                    port("lan1", None),
                ],
            )
            .member(
                "branch1",
                5,
                Role::Branch,
                vec![
                    routed("isp1", "192.0.2.6/30", Some("192.0.2.5")),
                    routed("isp2", "192.0.2.10/30", Some("192.0.2.9")),
                ],
            )
            .build()
    }

    #[test]
    fn tunnel_number_concatenates_id_and_sequence() {
        assert_eq!(tunnel_number(id(5), 0), Some(500));
        assert_eq!(tunnel_number(id(1), 3), Some(103));
        assert_eq!(tunnel_number(id(12), 7), Some(1207));
        assert_eq!(tunnel_number(id(99), 99), Some(9999));
    }

    #[test]
    fn tunnel_number_overflow_is_reported() {
        assert_eq!(tunnel_number(id(100), 0), None);
        assert_eq!(tunnel_number(id(5), 100), None);
    }

    #[test]
    fn hub_model_numbers_tunnels_by_remote_id() {
        let run = assemble_all(&scenario()).unwrap();
        let hub = run.device("hub1").unwrap();
        let remote = &hub.remotes["branch1"];

        let names: Vec<&str> = remote.tunnels.values().map(|t| t.interface.as_str()).collect();
        assert_eq!(names, ["tunnel.500", "tunnel.501", "tunnel.502", "tunnel.503"]);

        let first = &remote.tunnels["branch1_isp1_isp1"];
        assert_eq!(first.tunnel_ip.to_string(), "100.64.5.0/31");
        assert_eq!(first.monitor_ip, Ipv4Addr::new(100, 64, 5, 1));
        assert_eq!(first.local_interface, "ethernet1/isp1");
        assert_eq!(first.local_ip.unwrap().to_string(), "203.0.113.2/30");
        assert_eq!(first.peer_ip, Some(Ipv4Addr::new(192, 0, 2, 6)));
    }

    #[test]
    fn branch_model_sees_the_spoke_side() {
        let run = assemble_all(&scenario()).unwrap();
        let branch = run.device("branch1").unwrap();
        let remote = &branch.remotes["hub1"];

        let order: Vec<(&str, &str)> = remote
            .tunnels
            .iter()
            .map(|(name, t)| (name.as_str(), t.interface.as_str()))
            .collect();
        assert_eq!(
            order,
            [
                ("hub1_isp1_isp1", "tunnel.100"),
                ("hub1_isp2_isp1", "tunnel.101"),
                ("hub1_isp1_isp2", "tunnel.102"),
                ("hub1_isp2_isp2", "tunnel.103"),
            ]
        );

        let first = &remote.tunnels["hub1_isp1_isp1"];
        assert_eq!(first.tunnel_ip.to_string(), "100.64.5.1/31");
        assert_eq!(first.monitor_ip, Ipv4Addr::new(100, 64, 5, 0));
        assert_eq!(first.peer_ip, Some(Ipv4Addr::new(203, 0, 113, 2)));
    }

    #[test]
    fn remote_record_carries_ids_and_loopback() {
        let run = assemble_all(&scenario()).unwrap();
        let hub = run.device("hub1").unwrap();
        assert_eq!(hub.asn, 65_001);
        assert_eq!(hub.template, "hub1");

        let remote = &hub.remotes["branch1"];
        assert_eq!(remote.id, id(5));
        assert_eq!(remote.sdwan_interface, 105);
        assert_eq!(remote.loopback, Ipv4Addr::new(10, 255, 0, 5));
    }

    #[test]
    fn static_routes_follow_same_keyed_interfaces() {
        let run = assemble_all(&scenario()).unwrap();
        let hub = run.device("hub1").unwrap();
        let routes = &hub.remotes["branch1"].routes;

        let got: Vec<(String, &str, String)> = routes
            .iter()
            .map(|(net, r)| (net.to_string(), r.interface.as_str(), r.gateway.to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("192.0.2.4/30".into(), "ethernet1/isp1", "203.0.113.1".into()),
                ("192.0.2.8/30".into(), "ethernet1/isp2", "198.51.100.1".into()),
            ]
        );
    }

    #[test]
    fn unaddressed_remote_interface_skips_route_but_keeps_tunnels() {
        let topo = TopologyBuilder::new()
            .member(
                "hub1",
                1,
                Role::Hub,
                vec![routed("isp1", "203.0.113.2/30", Some("203.0.113.1"))],
            )
            .member("branch1", 5, Role::Branch, vec![{
                let mut dhcp = port("isp1", None);
                dhcp.l3 = true;
                dhcp
            }])
            .build();

        let run = assemble_all(&topo).unwrap();
        let remote = &run.device("hub1").unwrap().remotes["branch1"];
        assert!(remote.routes.is_empty());
        assert_eq!(remote.tunnels.len(), 1);
        assert_eq!(remote.tunnels["branch1_isp1_isp1"].peer_ip, None);
    }

    #[test]
    fn local_interface_without_gateway_skips_route() {
        let topo = TopologyBuilder::new()
            .member("hub1", 1, Role::Hub, vec![routed("wan1", "10.0.0.1/24", None)])
            .member(
                "branch1",
                5,
                Role::Branch,
                vec![routed("wan1", "10.0.5.1/24", Some("10.0.5.254"))],
            )
            .build();

        let run = assemble_all(&topo).unwrap();
        assert!(run.device("hub1").unwrap().remotes["branch1"].routes.is_empty());
        let branch_routes = &run.device("branch1").unwrap().remotes["hub1"].routes;
        assert_eq!(branch_routes.len(), 1);
        assert!(branch_routes.contains_key(&"10.0.0.0/24".parse::<Ipv4Net>().unwrap()));
    }

    #[test]
    fn classified_interfaces_reach_the_model() {
        let run = assemble_all(&scenario()).unwrap();
        let hub = run.device("hub1").unwrap();
        assert_eq!(hub.interfaces["isp1"].sdwan_profile.as_deref(), Some("ISP1"));
        assert_eq!(hub.interfaces["isp2"].sdwan_profile.as_deref(), Some("Internet"));
        assert_eq!(hub.interfaces["lan1"].zone.as_deref(), Some("zone-internal"));
        assert!(hub.profiles.contains_key("ISP1"));
    }

    #[test]
    fn single_role_topology_has_no_remotes() {
        let topo = TopologyBuilder::new()
            .member("hub1", 1, Role::Hub, vec![port("isp1", None)])
            .member("hub2", 2, Role::Hub, vec![port("isp1", None)])
            .build();
        let run = assemble_all(&topo).unwrap();
        assert!(run.mesh.is_empty());
        assert!(run.devices.values().all(|d| d.remotes.is_empty()));
    }

    #[test]
    fn large_remote_id_aborts_the_run() {
        let topo = TopologyBuilder::new()
            .member("hub1", 1, Role::Hub, vec![port("isp1", None)])
            .member("branch1", 120, Role::Branch, vec![port("isp1", None)])
            .build();

        let err = assemble_all(&topo).unwrap_err();
        assert!(matches!(
            err,
            CoreError::TunnelNumberOverflow { remote_id: 120, sequence: 0, .. }
        ));
    }

    #[test]
    fn assembly_is_deterministic_across_insertion_order() {
        let forward = scenario();
        let reversed = TopologyBuilder::new()
            .member(
                "branch1",
                5,
                Role::Branch,
                vec![
                    routed("isp2", "192.0.2.10/30", Some("192.0.2.9")),
                    routed("isp1", "192.0.2.6/30", Some("192.0.2.5")),
                ],
            )
            .member(
                "hub1",
                1,
                Role::Hub,
                vec![
                    port("lan1", None),
                    routed("isp2", "198.51.100.2/30", Some("198.51.100.1")),
                    routed("isp1", "203.0.113.2/30", Some("203.0.113.1")),
                ],
            )
            .profile("ISP1")
            .build();

        let a = assemble_all(&forward).unwrap();
        let b = assemble_all(&reversed).unwrap();
        assert_eq!(a.devices, b.devices);
        assert_eq!(a.mesh, b.mesh);

        let a_json = serde_json::to_string(&a.devices).unwrap();
        let b_json = serde_json::to_string(&assemble_all(&forward).unwrap().devices).unwrap();
        assert_eq!(a_json, b_json);
    }
}
