// ── Test fixtures ──

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::model::{Interface, Member, MemberId, OutputTarget, Profiles, Role, Topology};
use crate::pool::TunnelPool;

#[derive(Default)]
pub(crate) struct TopologyBuilder {
    members: BTreeMap<String, Member>,
    profiles: Profiles,
}

impl TopologyBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn member(mut self, name: &str, id: u8, role: Role, ports: Vec<Interface>) -> Self {
        let member = Member {
            name: name.into(),
            id: MemberId::new(id).expect("fixture ids are non-zero"),
            role,
            serial: format!("SN-{name}"),
            router_id: Ipv4Addr::new(10, 255, 0, id),
            interfaces: ports.into_iter().map(|p| (p.key.clone(), p)).collect(),
        };
        self.members.insert(name.into(), member);
        self
    }

    pub(crate) fn profile(mut self, name: &str) -> Self {
        self.profiles
            .insert(name.into(), serde_json::json!({ "name": name }));
        self
    }

    pub(crate) fn build(self) -> Topology {
        Topology::new(
            self.members,
            self.profiles,
            TunnelPool::default(),
            OutputTarget::default(),
        )
        .expect("fixture topology is valid")
    }
}

/// An interface named `ethernet1/<key>`, optionally addressed, not routed.
pub(crate) fn port(key: &str, address: Option<&str>) -> Interface {
    Interface {
        key: key.into(),
        name: format!("ethernet1/{key}"),
        address: address.map(|a| a.parse().expect("fixture address")),
        l3: false,
        gateway: None,
        zone: None,
        sdwan_profile: None,
    }
}

/// A routed (L3) interface with an address and optional gateway.
pub(crate) fn routed(key: &str, address: &str, gateway: Option<&str>) -> Interface {
    Interface {
        l3: true,
        gateway: gateway.map(|g| g.parse().expect("fixture gateway")),
        ..port(key, Some(address))
    }
}
