// Node records as seen by the gossip scheduler

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Membership state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Alive,
    Suspect,
    Dead,
    /// Left the cluster on purpose
    Left,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Alive => write!(f, "alive"),
            NodeStatus::Suspect => write!(f, "suspect"),
            NodeStatus::Dead => write!(f, "dead"),
            NodeStatus::Left => write!(f, "left"),
        }
    }
}

/// What the scaling helpers need to know about a member.
///
/// The membership state machine owns its node type; implementing this trait
/// lets [`move_dead_nodes`](super::move_dead_nodes) reorder it directly.
pub trait NodeRecord {
    fn status(&self) -> NodeStatus;
    /// When `status` last changed
    fn state_change(&self) -> Instant;
}

impl<T: NodeRecord + ?Sized> NodeRecord for Arc<T> {
    fn status(&self) -> NodeStatus {
        (**self).status()
    }

    fn state_change(&self) -> Instant {
        (**self).state_change()
    }
}

/// A cluster member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique node name
    pub name: String,
    pub addr: SocketAddr,
    pub incarnation: u32,
    pub status: NodeStatus,
    pub state_change: Instant,
}

impl Node {
    /// Create a new alive node
    pub fn new(name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            addr,
            incarnation: 0,
            status: NodeStatus::Alive,
            state_change: Instant::now(),
        }
    }

    /// Move to `status`, stamping the transition time
    pub fn transition(&mut self, status: NodeStatus) {
        if self.status != status {
            self.status = status;
            self.state_change = Instant::now();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == NodeStatus::Alive
    }
}

impl NodeRecord for Node {
    fn status(&self) -> NodeStatus {
        self.status
    }

    fn state_change(&self) -> Instant {
        self.state_change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:7946".parse().unwrap()
    }

    #[test]
    fn test_new_node_is_alive() {
        let node = Node::new("a", addr());
        assert!(node.is_alive());
        assert_eq!(node.incarnation, 0);
    }

    #[test]
    fn test_transition_stamps_change() {
        let mut node = Node::new("a", addr());
        let before = node.state_change;

        node.transition(NodeStatus::Suspect);
        assert_eq!(node.status, NodeStatus::Suspect);
        assert!(node.state_change >= before);

        let stamped = node.state_change;
        node.transition(NodeStatus::Suspect);
        assert_eq!(node.state_change, stamped);
    }

    #[test]
    fn test_record_through_arc() {
        let mut node = Node::new("a", addr());
        node.transition(NodeStatus::Dead);
        let shared = Arc::new(node);

        assert_eq!(NodeRecord::status(&shared), NodeStatus::Dead);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(NodeStatus::Alive.to_string(), "alive");
        assert_eq!(NodeStatus::Left.to_string(), "left");
    }
}
