//! Cluster-size-aware timing and fan-out
//!
//! Gossip traffic must stay sub-linear in cluster size. These functions turn
//! the configured multipliers into concrete limits for a cluster of `n`
//! nodes. All of them are pure.

use std::time::Duration;

/// Cluster size up to which push/pull syncs run at the configured interval.
/// Node 33 doubles the interval, node 65 triples it.
pub const PUSH_PULL_SCALE_THRESHOLD: usize = 32;

/// Number of times a broadcast is retransmitted before it is dropped:
/// `retransmit_mult * ceil(log10(n + 1))`
pub fn retransmit_limit(retransmit_mult: usize, n: usize) -> usize {
    let node_scale = ((n as f64) + 1.0).log10().ceil();
    retransmit_mult * node_scale as usize
}

/// Upper suspicion timeout for a cluster of `n` nodes:
/// `suspicion_mult * max(1, log10(max(1, n))) * interval`
///
/// The node scale is carried in thousandths so sub-second intervals are not
/// truncated to zero.
pub fn suspicion_timeout(suspicion_mult: u32, n: usize, interval: Duration) -> Duration {
    let node_scale = (n.max(1) as f64).log10().max(1.0);
    let scale_millis = (node_scale * 1000.0) as u32;
    interval
        .saturating_mul(suspicion_mult)
        .saturating_mul(scale_millis)
        / 1000
}

/// Push/pull interval for a cluster of `n` nodes
///
/// Full state exchange costs O(n) per sync, so the sync rate has to fall as
/// the cluster grows or aggregate bandwidth goes quadratic.
pub fn push_pull_scale(interval: Duration, n: usize) -> Duration {
    if n <= PUSH_PULL_SCALE_THRESHOLD {
        return interval;
    }

    let multiplier =
        ((n as f64).log2() - (PUSH_PULL_SCALE_THRESHOLD as f64).log2()).ceil() + 1.0;
    interval.saturating_mul(multiplier as u32)
}
