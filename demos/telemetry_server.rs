//! Telemetry streaming server demo
//!
//! Runs the full stack against a simulated fleet, so no provider credentials
//! are needed.
//!
//! Run with: cargo run --example telemetry_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example telemetry_server                  # binds to 0.0.0.0:5000
//!   cargo run --example telemetry_server localhost        # binds to 127.0.0.1:5000
//!   cargo run --example telemetry_server 127.0.0.1:5001   # binds to 127.0.0.1:5001
//!
//! Then connect a client, e.g.:
//!   websocat ws://127.0.0.1:5000/

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fleet_stream::server::{ServerConfig, WsServer};
use fleet_stream::source::SimulatedSource;

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:5000
/// - "127.0.0.1" -> 127.0.0.1:5000
/// - "127.0.0.1:5001" -> 127.0.0.1:5001
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 5000;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: telemetry_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:5000)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:5000".parse().unwrap(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fleet_stream=debug".parse()?),
        )
        .init();

    let config = ServerConfig::default()
        .bind(bind_addr)
        .poll_interval(Duration::from_secs(2));
    let source = Arc::new(SimulatedSource::new(8));

    println!("Starting telemetry server on {}", config.bind_addr);
    println!();
    println!("=== Watch the fleet ===");
    println!("websocat ws://{}/", config.bind_addr);
    println!();

    let server = WsServer::new(config, source);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    Ok(())
}
