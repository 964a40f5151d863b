// ── Interface classification ──
//
// Zone and SD-WAN profile are assigned purely from the interface key's
// prefix and the owning member's role. Classification returns new values;
// the loaded topology is never touched.

use std::fmt;

use tracing::warn;

use crate::model::{Interface, InterfaceKind, Member, Profiles, Role, Topology};

pub const PROFILE_MPLS: &str = "MPLS";
pub const PROFILE_INTERNET: &str = "Internet";

pub const ZONE_TO_BRANCH: &str = "zone-to-branch";
pub const ZONE_TO_HUB: &str = "zone-to-hub";
pub const ZONE_INTERNET: &str = "zone-internet";
pub const ZONE_INTERNAL: &str = "zone-internal";

/// Profile and zone for one interface key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub profile: Option<String>,
    pub zone: Option<String>,
}

/// An interface whose key matched none of the naming conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationWarning {
    pub member: String,
    pub interface: String,
}

impl fmt::Display for ClassificationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: unknown interface type '{}', zone/profile left unassigned",
            self.member, self.interface
        )
    }
}

/// Classify an interface key for a member of `role`.
///
/// `isp*` keys map to the upper-cased key as profile name when such a
/// profile exists, `Internet` otherwise. `lan*` keys get a zone only.
/// Unknown prefixes yield an empty classification.
pub fn classify(key: &str, role: Role, profiles: &Profiles) -> Classification {
    match InterfaceKind::from_key(key) {
        InterfaceKind::Wan => Classification {
            profile: Some(PROFILE_MPLS.into()),
            zone: Some(
                match role {
                    Role::Hub => ZONE_TO_BRANCH,
                    Role::Branch => ZONE_TO_HUB,
                }
                .into(),
            ),
        },
        InterfaceKind::Isp => {
            let upper = key.to_uppercase();
            let profile = if profiles.contains_key(&upper) {
                upper
            } else {
                PROFILE_INTERNET.into()
            };
            Classification {
                profile: Some(profile),
                zone: Some(ZONE_INTERNET.into()),
            }
        }
        InterfaceKind::Lan => Classification {
            profile: None,
            zone: Some(ZONE_INTERNAL.into()),
        },
        InterfaceKind::Other => Classification::default(),
    }
}

/// Return a classified copy of `interface`.
///
/// A `lan*` interface that already carries a zone keeps it; anything with
/// an unknown prefix comes back unchanged.
pub fn classify_interface(interface: &Interface, role: Role, profiles: &Profiles) -> Interface {
    let mut out = interface.clone();
    let class = classify(&interface.key, role, profiles);

    match interface.kind() {
        InterfaceKind::Wan | InterfaceKind::Isp => {
            out.sdwan_profile = class.profile;
            out.zone = class.zone;
        }
        InterfaceKind::Lan => {
            if out.zone.is_none() {
                out.zone = class.zone;
            }
        }
        InterfaceKind::Other => {}
    }
    out
}

/// Classify every interface of a member.
pub fn classify_member(member: &Member, profiles: &Profiles) -> (Member, Vec<ClassificationWarning>) {
    let mut warnings = Vec::new();
    let mut classified = member.clone();

    for (key, interface) in &member.interfaces {
        if interface.kind() == InterfaceKind::Other {
            let warning = ClassificationWarning {
                member: member.name.clone(),
                interface: key.clone(),
            };
            warn!("{warning}");
            warnings.push(warning);
            continue;
        }
        classified.interfaces.insert(
            key.clone(),
            classify_interface(interface, member.role, profiles),
        );
    }

    (classified, warnings)
}

/// Classify the whole topology, returning a new one plus all warnings.
pub fn classify_topology(topology: &Topology) -> (Topology, Vec<ClassificationWarning>) {
    let mut warnings = Vec::new();
    let members = topology
        .members()
        .map(|member| {
            let (classified, mut w) = classify_member(member, topology.profiles());
            warnings.append(&mut w);
            (classified.name.clone(), classified)
        })
        .collect();

    (topology.with_members(members), warnings)
}
