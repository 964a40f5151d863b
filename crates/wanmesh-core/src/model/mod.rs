// ── Typed domain model ──
//
// Explicit records for everything that flows through a generation run:
// topology -> classified interfaces -> tunnel mesh -> per-device models.

pub mod device;
pub mod member;
pub mod topology;
pub mod tunnel;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use wanmesh_core::model::*` gives you everything.

pub use device::{DeviceModel, RemoteRecord, StaticRoute, TunnelInterface};
pub use member::{Interface, InterfaceKind, Member, MemberId, Role};
pub use topology::{OutputTarget, Profiles, Topology};
pub use tunnel::TunnelEdge;
