//! Cluster Tests
//!
//! A client configured with two servers partitions keys between them.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::FakeServer;
use memcached_udp::{Client, Config};

fn cluster_client(servers: &[&FakeServer]) -> Client {
    let mut builder = Config::builder()
        .response_timeout(Duration::from_secs(5))
        .receive_timeout(Duration::from_millis(200));
    for server in servers {
        builder = builder.server_addr(server.addr());
    }
    Client::new(builder.build().unwrap()).unwrap()
}

#[test]
fn test_cluster_set_get() {
    let (a, b) = (FakeServer::start(), FakeServer::start());
    let client = cluster_client(&[&a, &b]);

    client.set("key1", "value-123456").unwrap();
    assert_eq!(client.get("key1").unwrap().as_deref(), Some("value-123456"));
    assert_eq!(client.get("not-found").unwrap(), None);
}

#[test]
fn test_pick_is_deterministic() {
    let (a, b) = (FakeServer::start(), FakeServer::start());
    let client = cluster_client(&[&a, &b]);

    for i in 0..200 {
        let key = format!("key-{}", i);
        let first = client.pick_server(&key);
        for _ in 0..3 {
            assert_eq!(client.pick_server(&key), first);
        }
    }
}

#[test]
fn test_keys_are_spread_over_both_servers() {
    let (a, b) = (FakeServer::start(), FakeServer::start());
    let client = cluster_client(&[&a, &b]);

    let used: HashSet<_> = (0..100)
        .map(|i| client.pick_server(&format!("key-{}", i)))
        .collect();
    assert_eq!(used.len(), 2);

    for i in 0..100 {
        client.set(&format!("key-{}", i), &format!("value-{}", i)).unwrap();
    }
    // Each key went to exactly one server
    assert_eq!(a.requests() + b.requests(), 100);
    assert!(a.requests() > 0 && b.requests() > 0);
}

#[test]
fn test_values_live_on_their_own_server() {
    let (a, b) = (FakeServer::start(), FakeServer::start());
    let both = cluster_client(&[&a, &b]);
    let only_a = cluster_client(&[&a]);

    let key = (0..)
        .map(|i| format!("spread-{}", i))
        .find(|k| both.pick_server(k) == b.addr())
        .unwrap();

    both.set(&key, "on-b").unwrap();
    assert_eq!(both.get(&key).unwrap().as_deref(), Some("on-b"));
    // No replication: server a never saw it
    assert_eq!(only_a.get(&key).unwrap(), None);
}

#[test]
fn test_parallel_set_get_cluster() {
    let (a, b) = (FakeServer::start(), FakeServer::start());
    let client = Arc::new(cluster_client(&[&a, &b]));

    crossbeam::thread::scope(|s| {
        for t in 0..5 {
            let client = Arc::clone(&client);
            s.spawn(move |_| {
                for i in 0..50 {
                    let key = format!("{}-key-parallel-{}", t, i);
                    client.set(&key, &format!("{}-value-parallel-{}", t, i)).unwrap();
                }
                for i in 0..50 {
                    let key = format!("{}-key-parallel-{}", t, i);
                    let expected = format!("{}-value-parallel-{}", t, i);
                    assert_eq!(client.get(&key).unwrap(), Some(expected));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(client.pending(a.addr()), 0);
    assert_eq!(client.pending(b.addr()), 0);
}
