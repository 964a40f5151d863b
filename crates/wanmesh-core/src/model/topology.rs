// ── Topology: the validated, read-only input of a generation run ──

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::member::{Member, MemberId, Role};
use crate::error::CoreError;
use crate::pool::TunnelPool;

/// Where rendered configuration is headed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputTarget {
    /// One aggregated artifact for a management server.
    #[default]
    Panorama,
    /// One artifact per firewall.
    Standalone,
}

/// Opaque SD-WAN profile definitions, passed through to the renderer.
pub type Profiles = BTreeMap<String, serde_json::Value>;

/// The full input of a generation run.
///
/// Members are keyed by name in a sorted map, so every iteration over the
/// topology has a fixed order independent of how the source file was laid
/// out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topology {
    members: BTreeMap<String, Member>,
    profiles: Profiles,
    pool: TunnelPool,
    target: OutputTarget,
}

impl Topology {
    /// Build a topology, enforcing the structural invariants:
    /// unique member ids, non-empty serials, and map keys matching names.
    pub fn new(
        members: BTreeMap<String, Member>,
        profiles: Profiles,
        pool: TunnelPool,
        target: OutputTarget,
    ) -> Result<Self, CoreError> {
        let mut seen: BTreeMap<MemberId, &str> = BTreeMap::new();

        for (key, member) in &members {
            if *key != member.name {
                return Err(CoreError::MemberKeyMismatch {
                    member: member.name.clone(),
                    key: key.clone(),
                });
            }
            if member.serial.trim().is_empty() {
                return Err(CoreError::EmptyField {
                    member: member.name.clone(),
                    field: "serial",
                });
            }
            match seen.entry(member.id) {
                Entry::Occupied(first) => {
                    return Err(CoreError::DuplicateMemberId {
                        id: member.id.get(),
                        first: (*first.get()).to_owned(),
                        second: member.name.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(&member.name);
                }
            }
        }

        Ok(Self {
            members,
            profiles,
            pool,
            target,
        })
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Members with the given role, in name order.
    pub fn members_with_role(&self, role: Role) -> impl Iterator<Item = &Member> {
        self.members.values().filter(move |m| m.role == role)
    }

    pub fn hubs(&self) -> impl Iterator<Item = &Member> {
        self.members_with_role(Role::Hub)
    }

    pub fn spokes(&self) -> impl Iterator<Item = &Member> {
        self.members_with_role(Role::Branch)
    }

    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    pub fn pool(&self) -> &TunnelPool {
        &self.pool
    }

    pub fn target(&self) -> OutputTarget {
        self.target
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Replace every member's interface set, keeping everything else.
    ///
    /// Used by the assembler to derive the classified topology from the
    /// loaded one without mutating the original.
    pub(crate) fn with_members(&self, members: BTreeMap<String, Member>) -> Self {
        Self {
            members,
            profiles: self.profiles.clone(),
            pool: self.pool,
            target: self.target,
        }
    }
}
