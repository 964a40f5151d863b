// ── Topology file loading ──
//
// The YAML topology is parsed into loose raw records first so that missing
// or malformed fields produce precise errors, then translated into the
// validated `wanmesh_core::Topology`. Nothing downstream ever sees a
// half-valid topology.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::Path;

use ipnet::Ipv4Net;
use serde::Deserialize;
use tracing::debug;

use wanmesh_core::{
    Interface, Member, MemberId, OutputTarget, Profiles, Role, Topology, TunnelPool,
};

use crate::ConfigError;

// ── Raw file layout ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawTopology {
    target: Option<String>,
    tunnels: Option<RawTunnels>,
    profiles: Option<Profiles>,
    #[serde(default)]
    members: BTreeMap<String, RawMember>,
}

#[derive(Debug, Deserialize)]
struct RawTunnels {
    pool: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    id: Option<i64>,
    role: Option<String>,
    /// Serials are often all digits; accept any YAML scalar.
    sn: Option<serde_yaml::Value>,
    router_id: Option<String>,
    interfaces: Option<BTreeMap<String, RawInterface>>,
}

#[derive(Debug, Deserialize)]
struct RawInterface {
    name: Option<String>,
    address: Option<String>,
    #[serde(default)]
    l3: bool,
    sdwan_gw: Option<String>,
    zone: Option<String>,
}

// ── Loading ─────────────────────────────────────────────────────────

/// Read and validate a topology file.
pub fn load_topology(path: &Path) -> Result<Topology, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadTopology {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "loaded topology file");
    parse_topology(&text)
}

/// Parse and validate a topology document.
pub fn parse_topology(text: &str) -> Result<Topology, ConfigError> {
    let raw: RawTopology = serde_yaml::from_str(text)?;

    let target = match raw.target.as_deref() {
        None => OutputTarget::default(),
        Some(t) => t.parse().map_err(|_| ConfigError::Validation {
            field: "target".into(),
            reason: format!("expected 'panorama' or 'standalone', got '{t}'"),
        })?,
    };

    let pool = match raw.tunnels.and_then(|t| t.pool) {
        None => TunnelPool::default(),
        Some(p) => p.parse::<TunnelPool>()?,
    };

    let members = raw
        .members
        .into_iter()
        .map(|(name, member)| Ok((name.clone(), convert_member(name, member)?)))
        .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

    let topology = Topology::new(members, raw.profiles.unwrap_or_default(), pool, target)?;
    debug!(members = topology.len(), pool = %pool, %target, "topology validated");
    Ok(topology)
}

fn convert_member(name: String, raw: RawMember) -> Result<Member, ConfigError> {
    let missing = |field: &'static str| ConfigError::MissingField {
        member: name.clone(),
        field,
    };

    let raw_id = raw.id.ok_or_else(|| missing("id"))?;
    let id = u8::try_from(raw_id)
        .ok()
        .and_then(MemberId::new)
        .ok_or_else(|| ConfigError::Validation {
            field: format!("members.{name}.id"),
            reason: format!("expected an integer in 1..=255, got {raw_id}"),
        })?;

    let raw_role = raw.role.ok_or_else(|| missing("role"))?;
    let role: Role = raw_role.parse().map_err(|_| ConfigError::Validation {
        field: format!("members.{name}.role"),
        reason: format!("expected 'hub' or 'branch', got '{raw_role}'"),
    })?;

    let serial = raw
        .sn
        .as_ref()
        .and_then(scalar_to_string)
        .ok_or_else(|| missing("sn"))?;

    let raw_router_id = raw.router_id.ok_or_else(|| missing("router_id"))?;
    let router_id = parse_host(&raw_router_id, || format!("members.{name}.router_id"))?;

    let interfaces = raw
        .interfaces
        .unwrap_or_default()
        .into_iter()
        .map(|(key, iface)| {
            let converted = convert_interface(&name, &key, iface)?;
            Ok((key, converted))
        })
        .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

    Ok(Member {
        name,
        id,
        role,
        serial,
        router_id,
        interfaces,
    })
}

fn convert_interface(member: &str, key: &str, raw: RawInterface) -> Result<Interface, ConfigError> {
    let field = |leaf: &str| format!("members.{member}.interfaces.{key}.{leaf}");

    let address = raw
        .address
        .as_deref()
        .map(|a| {
            a.trim().parse::<Ipv4Net>().map_err(|_| ConfigError::Validation {
                field: field("address"),
                reason: format!("expected an IPv4 address with prefix length, got '{a}'"),
            })
        })
        .transpose()?;

    let gateway = raw
        .sdwan_gw
        .as_deref()
        .map(|g| parse_host(g, || field("sdwan_gw")))
        .transpose()?;

    Ok(Interface {
        key: key.to_owned(),
        name: raw.name.unwrap_or_else(|| key.to_owned()),
        address,
        l3: raw.l3,
        gateway,
        zone: raw.zone,
        sdwan_profile: None,
    })
}

fn parse_host(value: &str, field: impl FnOnce() -> String) -> Result<Ipv4Addr, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Validation {
        field: field(),
        reason: format!("expected an IPv4 address, got '{value}'"),
    })
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    let s = match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.trim().is_empty()).then_some(s)
}
