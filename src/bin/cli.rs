//! memcached-udp CLI Client
//!
//! Command-line interface for storing and fetching values over UDP.

use std::time::Duration;

use clap::{Parser, Subcommand};
use memcached_udp::{Client, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// memcached-udp CLI
#[derive(Parser, Debug)]
#[command(name = "memcached-udp-cli")]
#[command(about = "Talk to memcached servers over UDP")]
#[command(version)]
struct Args {
    /// Server address (host:port); repeat for several servers
    #[arg(short, long, default_value = "127.0.0.1:11211")]
    server: Vec<String>,

    /// Response timeout in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,

    /// Print receiver diagnostics
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let default_filter = if args.debug {
        "info,memcached_udp=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = match Config::builder()
        .servers(args.server.iter().cloned())
        .response_timeout(Duration::from_secs(args.timeout))
        .debug(args.debug)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client = match Client::new(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = match args.command {
        Commands::Get { key } => client.get(&key).map(|value| match value {
            Some(v) => println!("{}", v),
            None => println!("(not found)"),
        }),
        Commands::Set { key, value } => client.set(&key, &value).map(|()| println!("STORED")),
    };

    if let Err(e) = outcome {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
