//! Randomized peer selection and dead node compaction
//!
//! Randomness is always passed in so tests can drive these with a seeded
//! generator.

use super::node::{NodeRecord, NodeStatus};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

/// Uniform random offset in `0..n`, or 0 for an empty range
pub fn random_offset<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    rng.gen_range(0..n)
}

/// Pick up to `k` distinct nodes at random, skipping any for which `filter`
/// returns true.
///
/// At most `3 * nodes.len()` draws are made. With a large cluster and small
/// `k` that is far more than needed; with a small cluster and a restrictive
/// filter fewer than `k` nodes may come back, which is fine. The result is in
/// draw order.
pub fn k_random_nodes<'a, T, R, F>(rng: &mut R, k: usize, nodes: &'a [T], mut filter: F) -> Vec<&'a T>
where
    R: Rng + ?Sized,
    F: FnMut(&T) -> bool,
{
    let n = nodes.len();
    let mut picked: Vec<usize> = Vec::with_capacity(k.min(n));

    for _ in 0..3 * n {
        if picked.len() >= k {
            break;
        }

        let idx = random_offset(rng, n);
        if filter(&nodes[idx]) || picked.contains(&idx) {
            continue;
        }
        picked.push(idx);
    }

    picked.into_iter().map(|idx| &nodes[idx]).collect()
}

/// Fisher-Yates shuffle in place
pub fn shuffle_nodes<T, R: Rng + ?Sized>(rng: &mut R, nodes: &mut [T]) {
    nodes.shuffle(rng);
}

/// Move nodes that have been dead for longer than `gossip_to_the_dead_time`
/// to the end of the slice and return the index of the first moved node.
///
/// Recently dead nodes stay put so their death keeps being gossiped until
/// peers converge on it. Kept nodes retain their relative order.
pub fn move_dead_nodes<T: NodeRecord>(nodes: &mut [T], gossip_to_the_dead_time: Duration) -> usize {
    move_dead_nodes_at(nodes, gossip_to_the_dead_time, Instant::now())
}

/// [`move_dead_nodes`] against an explicit clock
pub fn move_dead_nodes_at<T: NodeRecord>(
    nodes: &mut [T],
    gossip_to_the_dead_time: Duration,
    now: Instant,
) -> usize {
    let mut keep = 0;
    for i in 0..nodes.len() {
        let node = &nodes[i];
        let evictable = node.status() == NodeStatus::Dead
            && now.saturating_duration_since(node.state_change()) > gossip_to_the_dead_time;

        if !evictable {
            nodes.swap(keep, i);
            keep += 1;
        }
    }
    keep
}
