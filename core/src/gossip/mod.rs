// Gossip module — scaling heuristics and peer selection for the scheduler

pub mod node;
pub mod sampling;
pub mod scaling;

pub use node::{Node, NodeRecord, NodeStatus};
pub use sampling::{k_random_nodes, move_dead_nodes, move_dead_nodes_at, random_offset, shuffle_nodes};
pub use scaling::{push_pull_scale, retransmit_limit, suspicion_timeout, PUSH_PULL_SCALE_THRESHOLD};
