// Integration tests for the scaling heuristics
//
// Peer sampling, dead node compaction and the size-dependent limits, checked
// as properties over generated clusters.

use gossamer_core::gossip::{
    k_random_nodes, move_dead_nodes_at, push_pull_scale, retransmit_limit, shuffle_nodes, Node,
    NodeStatus,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

fn cluster(n: usize) -> Vec<Node> {
    (0..n)
        .map(|i| Node::new(format!("node-{}", i), SocketAddr::from(([10, 0, 0, 1], 7000 + i as u16))))
        .collect()
}

#[test]
fn test_push_pull_scale_steps() {
    let iv = Duration::from_secs(30);
    assert_eq!(push_pull_scale(iv, 32), iv);
    assert_eq!(push_pull_scale(iv, 33), 2 * iv);
    assert_eq!(push_pull_scale(iv, 65), 3 * iv);
}

#[test]
fn test_gossip_round_over_shuffled_cluster() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut nodes = cluster(40);
    for node in nodes.iter_mut().take(5) {
        node.transition(NodeStatus::Dead);
    }

    shuffle_nodes(&mut rng, &mut nodes);
    let targets = k_random_nodes(&mut rng, 3, &nodes, |n| n.status != NodeStatus::Alive);

    assert_eq!(targets.len(), 3);
    assert!(targets.iter().all(|n| n.status == NodeStatus::Alive));
}

fn status_strategy() -> impl Strategy<Value = (NodeStatus, u64)> {
    (
        prop_oneof![
            Just(NodeStatus::Alive),
            Just(NodeStatus::Suspect),
            Just(NodeStatus::Dead),
            Just(NodeStatus::Left),
        ],
        0u64..120,
    )
}

proptest! {
    #[test]
    fn prop_k_random_nodes_distinct_members(n in 1usize..200, k in 0usize..8, seed in any::<u64>()) {
        prop_assume!(n >= k);
        let nodes = cluster(n);
        let mut rng = StdRng::seed_from_u64(seed);

        let picked = k_random_nodes(&mut rng, k, &nodes, |_| false);

        let names: HashSet<_> = picked.iter().map(|p| p.name.clone()).collect();
        prop_assert_eq!(names.len(), picked.len());
        prop_assert!(picked.len() <= k);
        prop_assert!(picked.iter().all(|p| nodes.iter().any(|n| n.name == p.name)));
        // With k small against a large cluster, 3n draws never fall short in practice
        if n >= 64 {
            prop_assert_eq!(picked.len(), k);
        }
    }

    #[test]
    fn prop_move_dead_nodes_partitions(states in proptest::collection::vec(status_strategy(), 0..64)) {
        let now = Instant::now() + Duration::from_secs(600);
        let grace = Duration::from_secs(30);

        let mut nodes = cluster(states.len());
        for (node, (status, age)) in nodes.iter_mut().zip(states.iter()) {
            node.status = *status;
            node.state_change = now - Duration::from_secs(*age);
        }
        let evictable = |n: &Node| n.status == NodeStatus::Dead && now - n.state_change > grace;
        let expected_kept: Vec<String> = nodes
            .iter()
            .filter(|n| !evictable(*n))
            .map(|n| n.name.clone())
            .collect();

        let idx = move_dead_nodes_at(&mut nodes, grace, now);

        prop_assert_eq!(idx, expected_kept.len());
        prop_assert!(nodes[idx..].iter().all(|n| evictable(n)));
        let kept: Vec<String> = nodes[..idx].iter().map(|n| n.name.clone()).collect();
        prop_assert_eq!(kept, expected_kept);
    }

    #[test]
    fn prop_retransmit_limit_monotonic(mult in 1usize..10, a in 0usize..50_000, b in 0usize..50_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(retransmit_limit(mult, lo) <= retransmit_limit(mult, hi));
    }
}
