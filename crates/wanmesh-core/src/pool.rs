// ── Tunnel address pool ──
//
// Point-to-point /31 subnets are carved out of a single flat pool. The
// spoke id selects a /24-sized block (third octet), the offset selects the
// /31 inside it. Allocation is a pure function of (pool, spoke id, offset).

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::Serialize;

use crate::error::CoreError;
use crate::model::MemberId;

/// Widest prefix that still leaves a full byte of address space per spoke id.
pub const MAX_POOL_PREFIX: u8 = 16;

/// /31 offsets available to one spoke: 256 addresses, two per edge.
pub const EDGES_PER_SPOKE: usize = 128;

const TUNNEL_PREFIX: u8 = 31;

/// The address block all tunnel subnets are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TunnelPool(Ipv4Net);

impl TunnelPool {
    /// Wrap a network, rejecting pools too narrow for the addressing scheme.
    pub fn new(net: Ipv4Net) -> Result<Self, CoreError> {
        if net.prefix_len() > MAX_POOL_PREFIX {
            return Err(CoreError::PoolTooNarrow {
                pool: net.to_string(),
                prefix_len: net.prefix_len(),
            });
        }
        Ok(Self(net.trunc()))
    }

    pub fn network(&self) -> Ipv4Net {
        self.0
    }

    /// Compute the hub/spoke /31 pair for `(spoke_id, offset)`.
    ///
    /// `base = network + (spoke_id << 8) + offset`; the hub takes `base`, the
    /// spoke takes `base + 1`. Injective as long as `offset` is even and
    /// below 256. Callers own offset bookkeeping.
    pub fn allocate(&self, spoke_id: MemberId, offset: u32) -> Result<TunnelPair, CoreError> {
        let network = self.0.network();
        let step = (u32::from(spoke_id.get()) << 8) + offset;
        let overflow = CoreError::AddressOverflow {
            base: network,
            offset: step,
        };
        let hub = u32::from(network).checked_add(step).ok_or(overflow)?;
        let spoke = hub.checked_add(1).ok_or(CoreError::AddressOverflow {
            base: network,
            offset: step + 1,
        })?;

        Ok(TunnelPair {
            hub: p2p(Ipv4Addr::from(hub)),
            spoke: p2p(Ipv4Addr::from(spoke)),
        })
    }
}

impl Default for TunnelPool {
    fn default() -> Self {
        Self(Ipv4Net::new(Ipv4Addr::new(100, 64, 0, 0), 16).expect("/16 is a valid prefix"))
    }
}

impl fmt::Display for TunnelPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TunnelPool {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net: Ipv4Net = s.trim().parse().map_err(|_| CoreError::InvalidPool {
            pool: s.to_owned(),
        })?;
        Self::new(net)
    }
}

/// Hub-side and spoke-side addresses of one point-to-point tunnel subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelPair {
    pub hub: Ipv4Net,
    pub spoke: Ipv4Net,
}

fn p2p(addr: Ipv4Addr) -> Ipv4Net {
    Ipv4Net::new(addr, TUNNEL_PREFIX).expect("/31 is a valid prefix")
}
