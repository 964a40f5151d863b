// ── Core error types ──
//
// Structural defects that abort a generation run. Classification warnings
// and skipped static routes are NOT errors -- they never reach this enum.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Topology structure ───────────────────────────────────────────
    #[error("Members '{first}' and '{second}' share id {id}")]
    DuplicateMemberId {
        id: u8,
        first: String,
        second: String,
    },

    #[error("Member '{member}' has an empty {field}")]
    EmptyField { member: String, field: &'static str },

    #[error("Member '{member}' is keyed as '{key}' in the member map")]
    MemberKeyMismatch { member: String, key: String },

    #[error("Member not found: {name}")]
    MemberNotFound { name: String },

    #[error("Member '{member}' has no interface '{interface}'")]
    InterfaceNotFound { member: String, interface: String },

    // ── Addressing ───────────────────────────────────────────────────
    #[error("Invalid tunnel pool '{pool}': expected an IPv4 CIDR such as 100.64.0.0/16")]
    InvalidPool { pool: String },

    #[error("Tunnel pool {pool} is too narrow: need a /16 or wider, got /{prefix_len}")]
    PoolTooNarrow { pool: String, prefix_len: u8 },

    #[error(
        "Spoke '{spoke}' needs {edges} tunnel edges but the pool holds at most {max} per spoke"
    )]
    PoolCapacityExceeded {
        spoke: String,
        edges: usize,
        max: usize,
    },

    #[error("Tunnel address {base} + {offset} falls outside the IPv4 space")]
    AddressOverflow { base: Ipv4Addr, offset: u32 },

    // ── Tunnel numbering ─────────────────────────────────────────────
    #[error(
        "Tunnel number for remote '{remote}' (id {remote_id}, sequence {sequence}) \
         does not fit the {digits}-digit interface range"
    )]
    TunnelNumberOverflow {
        remote: String,
        remote_id: u8,
        sequence: usize,
        digits: u32,
    },
}
