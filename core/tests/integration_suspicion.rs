// Integration tests for the suspicion timer
//
// Concurrent confirmations, fire-once behaviour, and wiring the timer to a
// node record the way a gossip scheduler would.

use gossamer_core::gossip::{Node, NodeStatus};
use gossamer_core::{GossipConfig, Suspicion};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirmations_fire_once() {
    let k = 8;
    let fired = Arc::new(AtomicU32::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let counter = Arc::clone(&fired);
    let suspicion = Suspicion::new(
        "origin",
        k,
        Duration::from_millis(50),
        Duration::from_secs(30),
        move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(n);
        },
    );

    let tasks: Vec<_> = (0..k)
        .map(|i| {
            let s = suspicion.clone();
            tokio::spawn(async move { s.confirm(&format!("peer-{}", i)) })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    assert!(results.into_iter().all(|r| r.unwrap()));
    assert_eq!(suspicion.confirmations(), k);

    let n = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, k);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(suspicion.has_fired());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_duplicate_confirmations_race() {
    let suspicion = Suspicion::new(
        "origin",
        3,
        Duration::from_secs(1),
        Duration::from_secs(10),
        |_| {},
    );

    // Everyone races to confirm as the same peer; exactly one wins
    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let s = suspicion.clone();
            tokio::spawn(async move { s.confirm("peer-b") })
        })
        .collect();

    let accepted = futures::future::join_all(tasks)
        .await
        .into_iter()
        .filter(|r| *r.as_ref().unwrap())
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(suspicion.confirmations(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_declares_node_dead() {
    let config = GossipConfig::default();
    let cluster_size = 10;
    let (min, max) = config.suspicion_bounds(cluster_size);
    let k = config.confirmation_target(cluster_size);
    assert_eq!(k, 2);

    let node = Arc::new(Mutex::new(Node::new("node-d", "127.0.0.1:7004".parse().unwrap())));
    node.lock().transition(NodeStatus::Suspect);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let target = Arc::clone(&node);
    let start = tokio::time::Instant::now();
    let suspicion = Suspicion::new("node-a", k, min, max, move |n| {
        let mut node = target.lock();
        // The callback owns the state check: a refuted node stays alive
        if node.status == NodeStatus::Suspect {
            node.transition(NodeStatus::Dead);
        }
        let _ = tx.send(n);
    });

    assert!(suspicion.confirm("node-b"));
    assert!(suspicion.confirm("node-c"));

    let n = rx.recv().await.unwrap();
    assert_eq!(n, 2);
    assert!(start.elapsed() >= min);
    assert!(start.elapsed() < max);
    assert_eq!(node.lock().status, NodeStatus::Dead);
}

#[tokio::test(start_paused = true)]
async fn test_refuted_node_ignores_expiry() {
    let node = Arc::new(Mutex::new(Node::new("node-d", "127.0.0.1:7004".parse().unwrap())));
    node.lock().transition(NodeStatus::Suspect);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let target = Arc::clone(&node);
    let _suspicion = Suspicion::new(
        "node-a",
        0,
        Duration::from_secs(1),
        Duration::from_secs(5),
        move |_| {
            let mut node = target.lock();
            if node.status == NodeStatus::Suspect {
                node.transition(NodeStatus::Dead);
            }
            let _ = tx.send(());
        },
    );

    // Refuted before the timer runs out
    node.lock().transition(NodeStatus::Alive);

    rx.recv().await.unwrap();
    assert_eq!(node.lock().status, NodeStatus::Alive);
}
