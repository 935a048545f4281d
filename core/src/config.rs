// Gossip configuration — multipliers and intervals, with cluster-size-derived limits

use crate::gossip::scaling::{push_pull_scale, retransmit_limit, suspicion_timeout};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for failure detection and dissemination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GossipConfig {
    /// Address to bind listeners on
    pub bind_addr: String,
    pub bind_port: u16,

    /// Address advertised to the cluster, if different from the bind address
    pub advertise_addr: Option<String>,
    pub advertise_port: Option<u16>,

    /// Retransmissions per broadcast are `retransmit_mult * ceil(log10(n + 1))`
    pub retransmit_mult: usize,

    /// Scales the upper suspicion timeout, see [`suspicion_timeout`]
    pub suspicion_mult: u32,

    /// Lower bound a suspicion is driven to by confirmations
    pub suspicion_min_timeout_ms: u64,

    /// Failure detector probe interval
    pub probe_interval_ms: u64,

    /// Base interval between full state syncs, scaled up in large clusters
    pub push_pull_interval_ms: u64,

    pub gossip_interval_ms: u64,
    /// Peers gossiped to per interval
    pub gossip_nodes: usize,

    /// How long dead nodes keep being gossiped about
    pub gossip_to_the_dead_time_ms: u64,

    pub enable_compression: bool,

    /// Packet budget; keeps compound messages under the link MTU
    pub udp_buffer_size: usize,

    /// Dial/IO timeout for stream connections
    pub tcp_timeout_ms: u64,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self::lan()
    }
}

impl GossipConfig {
    /// Defaults for a local area network
    pub fn lan() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            bind_port: 7946,
            advertise_addr: None,
            advertise_port: None,
            retransmit_mult: 4,
            suspicion_mult: 4,
            suspicion_min_timeout_ms: 500,
            probe_interval_ms: 1000,
            push_pull_interval_ms: 30_000,
            gossip_interval_ms: 200,
            gossip_nodes: 3,
            gossip_to_the_dead_time_ms: 30_000,
            enable_compression: true,
            udp_buffer_size: 1400,
            tcp_timeout_ms: 10_000,
        }
    }

    /// Higher latency, lossier links
    pub fn wan() -> Self {
        Self {
            suspicion_mult: 6,
            suspicion_min_timeout_ms: 2000,
            probe_interval_ms: 5000,
            push_pull_interval_ms: 60_000,
            gossip_interval_ms: 500,
            gossip_nodes: 4,
            gossip_to_the_dead_time_ms: 60_000,
            tcp_timeout_ms: 30_000,
            ..Self::lan()
        }
    }

    /// Loopback or a single host
    pub fn local() -> Self {
        Self {
            suspicion_mult: 3,
            suspicion_min_timeout_ms: 200,
            probe_interval_ms: 1000,
            push_pull_interval_ms: 15_000,
            gossip_interval_ms: 100,
            gossip_to_the_dead_time_ms: 15_000,
            tcp_timeout_ms: 1000,
            ..Self::lan()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "probe_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.gossip_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "gossip_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.push_pull_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "push_pull_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.suspicion_mult == 0 {
            return Err(ConfigError::Invalid(
                "suspicion_mult must be greater than 0".to_string(),
            ));
        }
        if self.retransmit_mult == 0 {
            return Err(ConfigError::Invalid(
                "retransmit_mult must be greater than 0".to_string(),
            ));
        }
        if self.udp_buffer_size < 64 {
            return Err(ConfigError::Invalid(
                "udp_buffer_size must be at least 64 bytes".to_string(),
            ));
        }
        self.advertise_ip()?;
        Ok(())
    }

    /// Parsed `advertise_addr`, `None` when the bind address should be used
    pub fn advertise_ip(&self) -> Result<Option<IpAddr>, ConfigError> {
        self.advertise_addr
            .as_deref()
            .map(|addr| {
                addr.parse().map_err(|_| {
                    ConfigError::Invalid(format!("advertise_addr {:?} is not an IP address", addr))
                })
            })
            .transpose()
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn gossip_interval(&self) -> Duration {
        Duration::from_millis(self.gossip_interval_ms)
    }

    pub fn gossip_to_the_dead_time(&self) -> Duration {
        Duration::from_millis(self.gossip_to_the_dead_time_ms)
    }

    pub fn tcp_timeout(&self) -> Duration {
        Duration::from_millis(self.tcp_timeout_ms)
    }

    /// Retransmissions per broadcast in a cluster of `n` nodes
    pub fn retransmit_limit(&self, n: usize) -> usize {
        retransmit_limit(self.retransmit_mult, n)
    }

    /// `(min, max)` suspicion timeouts in a cluster of `n` nodes.
    ///
    /// `max` grows with the cluster; `min` is the configured floor, never
    /// above `max`.
    pub fn suspicion_bounds(&self, n: usize) -> (Duration, Duration) {
        let max = suspicion_timeout(self.suspicion_mult, n, self.probe_interval());
        let min = Duration::from_millis(self.suspicion_min_timeout_ms).min(max);
        (min, max)
    }

    /// Confirmations wanted before a suspicion reaches its minimum timeout.
    ///
    /// `alive` counts the live members, including us and the suspect; the
    /// remaining peers are the only possible witnesses. Without enough of
    /// them the timer gets no acceleration target at all.
    pub fn confirmation_target(&self, alive: usize) -> u32 {
        let k = self.suspicion_mult.saturating_sub(2);
        if alive.saturating_sub(2) < k as usize {
            return 0;
        }
        k
    }

    /// Push/pull interval in a cluster of `n` nodes
    pub fn push_pull_interval(&self, n: usize) -> Duration {
        push_pull_scale(Duration::from_millis(self.push_pull_interval_ms), n)
    }
}
