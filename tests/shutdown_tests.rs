//! Shutdown Tests
//!
//! Dropping a client must stop its receiver thread. Kept in its own test
//! binary so no other client's receiver shares the process.

mod common;

use std::time::{Duration, Instant};

use common::FakeServer;
use memcached_udp::{Client, Config};

/// Receiver threads alive in this process, found by name in `/proc`.
/// Linux truncates thread names to 15 bytes.
#[cfg(target_os = "linux")]
fn live_receivers() -> usize {
    let prefix = &memcached_udp::receiver::RECEIVER_THREAD_NAME[..15];
    std::fs::read_dir("/proc/self/task")
        .unwrap()
        .filter_map(|task| std::fs::read_to_string(task.unwrap().path().join("comm")).ok())
        .filter(|comm| comm.trim_end() == prefix)
        .count()
}

#[cfg(target_os = "linux")]
#[test]
fn test_drop_stops_receiver_thread() {
    let server = FakeServer::start();
    let config = Config::builder()
        .server_addr(server.addr())
        .receive_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let client = Client::new(config).unwrap();
    client.set("k", "v").unwrap();
    assert_eq!(live_receivers(), 1);

    drop(client);

    // One receive timeout plus scheduling slack
    let deadline = Instant::now() + Duration::from_secs(2);
    while live_receivers() > 0 {
        assert!(Instant::now() < deadline, "receiver still running after drop");
        std::thread::sleep(Duration::from_millis(20));
    }
}
