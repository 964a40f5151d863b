//! Tunnel-mesh generation and per-device model assembly for hub/branch
//! SD-WAN topologies.
//!
//! Data flows one way through this crate, and every stage returns new
//! values rather than mutating its input:
//!
//! - **[`classify`]**: assigns a security zone and SD-WAN profile to each
//!   interface from its key prefix (`wan*`, `isp*`, `lan*`).
//!
//! - **[`TunnelPool`]**: carves point-to-point /31 subnets out of a single
//!   flat pool, keyed by spoke id and offset.
//!
//! - **[`build_mesh`]**: pairs every hub WAN/ISP interface with every spoke
//!   WAN/ISP interface and allocates one [`TunnelEdge`] per pairing.
//!
//! - **[`assemble_all`]**: produces one [`DeviceModel`] per member: its
//!   classified interfaces, static routes to each remote, and numbered
//!   tunnel interfaces. All-or-nothing: any structural defect aborts the run.
//!
//! Everything here is pure and synchronous. Loading a topology from disk and
//! rendering models into configuration text live in other crates.

pub mod assemble;
pub mod classify;
pub mod error;
pub mod mesh;
pub mod model;
pub mod pool;

#[cfg(test)]
pub(crate) mod fixtures;

// ── Primary re-exports ──────────────────────────────────────────────
pub use assemble::{Assembly, assemble, assemble_all, tunnel_number};
pub use classify::{Classification, ClassificationWarning, classify, classify_topology};
pub use error::CoreError;
pub use mesh::{TunnelMesh, build_mesh};
pub use pool::{TunnelPair, TunnelPool};

pub use model::{
    DeviceModel, Interface, InterfaceKind, Member, MemberId, OutputTarget, Profiles,
    RemoteRecord, Role, StaticRoute, Topology, TunnelEdge, TunnelInterface,
};
