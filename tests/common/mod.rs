//! In-process fake memcached UDP server shared by the integration tests.
//!
//! Speaks just enough of the protocol for the client: `set` and `get`,
//! with replies split into datagrams of at most `max_payload` bytes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use memcached_udp::protocol::{UdpHeader, HEADER_SIZE};

/// Knobs for misbehaving servers
#[derive(Debug, Clone)]
pub struct FakeOptions {
    /// Largest reply payload per datagram (memcached uses ~1400)
    pub max_payload: usize,

    /// Send multi-packet replies last packet first
    pub reverse_packets: bool,

    /// Answer every `set` with `NOT_STORED`
    pub reject_stores: bool,

    /// Never answer anything
    pub silent: bool,

    /// Before each reply, send a reply for a request id nobody asked for
    pub stray_replies: bool,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            max_payload: 1400,
            reverse_packets: false,
            reject_stores: false,
            silent: false,
            stray_replies: false,
        }
    }
}

pub struct FakeServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeServer {
    pub fn start() -> Self {
        Self::start_with(FakeOptions::default())
    }

    pub fn start_with(options: FakeOptions) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();
        let addr = socket.local_addr().unwrap();

        let requests = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let requests = Arc::clone(&requests);
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || serve(socket, options, requests, shutdown))
        };

        Self {
            addr,
            requests,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of request datagrams received so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    socket: UdpSocket,
    options: FakeOptions,
    requests: Arc<AtomicUsize>,
    shutdown: Arc<AtomicBool>,
) {
    let mut store: HashMap<String, Vec<u8>> = HashMap::new();
    let mut buf = vec![0u8; 65536];

    while !shutdown.load(Ordering::SeqCst) {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(r) => r,
            Err(_) => continue,
        };
        requests.fetch_add(1, Ordering::SeqCst);
        if options.silent || len < HEADER_SIZE {
            continue;
        }

        let header = UdpHeader::decode(&buf[..len]).unwrap();
        let reply = handle_command(&buf[HEADER_SIZE..len], &mut store, &options);

        if options.stray_replies {
            let stray = UdpHeader::new(header.request_id ^ 0x8000, 0, 1, 0);
            let mut datagram = stray.encode().to_vec();
            datagram.extend_from_slice(b"VALUE stray 0 5\r\nstray\r\nEND\r\n");
            let _ = socket.send_to(&datagram, from);
        }

        send_reply(&socket, from, header.request_id, &reply, &options);
    }
}

fn handle_command(
    request: &[u8],
    store: &mut HashMap<String, Vec<u8>>,
    options: &FakeOptions,
) -> Vec<u8> {
    let line_end = match request.windows(2).position(|w| w == b"\r\n") {
        Some(pos) => pos,
        None => return b"ERROR\r\n".to_vec(),
    };
    let line = String::from_utf8_lossy(&request[..line_end]).into_owned();
    let parts: Vec<&str> = line.split(' ').collect();

    match parts.as_slice() {
        ["set", key, _flags, _exptime, bytes] => {
            let bytes: usize = bytes.parse().unwrap();
            let start = line_end + 2;
            let value = request[start..start + bytes].to_vec();
            if options.reject_stores {
                return b"NOT_STORED\r\n".to_vec();
            }
            store.insert(key.to_string(), value);
            b"STORED\r\n".to_vec()
        }
        ["get", key] => match store.get(*key) {
            Some(value) => {
                let mut reply = format!("VALUE {} 0 {}\r\n", key, value.len()).into_bytes();
                reply.extend_from_slice(value);
                reply.extend_from_slice(b"\r\nEND\r\n");
                reply
            }
            None => b"END\r\n".to_vec(),
        },
        _ => b"ERROR\r\n".to_vec(),
    }
}

fn send_reply(
    socket: &UdpSocket,
    to: SocketAddr,
    request_id: u16,
    reply: &[u8],
    options: &FakeOptions,
) {
    let chunks: Vec<&[u8]> = reply.chunks(options.max_payload).collect();
    let total = chunks.len() as i16;

    let mut datagrams: Vec<Vec<u8>> = chunks
        .iter()
        .enumerate()
        .map(|(seq, chunk)| {
            let mut datagram = UdpHeader::new(request_id, seq as i16, total, 0)
                .encode()
                .to_vec();
            datagram.extend_from_slice(chunk);
            datagram
        })
        .collect();

    if options.reverse_packets {
        datagrams.reverse();
    }
    for datagram in datagrams {
        let _ = socket.send_to(&datagram, to);
    }
}
