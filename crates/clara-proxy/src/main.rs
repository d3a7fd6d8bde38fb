// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! clara-proxy — standalone XSUB/XPUB broker and control channel (§4.2).
//!
//! # Usage
//!
//! ```bash
//! # Bind on all interfaces, default port 7771 (sub port 7772, control 7773)
//! clara-proxy
//!
//! # Custom host/port
//! clara-proxy --host 10.2.9.1 --port 7780
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clara_msg::address::ProxyAddress;
use clara_msg::proxy::Proxy;
use tracing_subscriber::EnvFilter;

/// clara-msg pub/sub proxy broker
#[derive(Parser, Debug)]
#[command(name = "clara-proxy")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "XSUB/XPUB broker with control-handshake channel for clara-msg")]
struct Args {
    /// Host to bind the broker on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Publish (XSUB) port; subscribe port is this + 1, control port this + 2
    #[arg(short, long, default_value_t = clara_msg::address::DEFAULT_PROXY_PORT)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let address = ProxyAddress::with_port(&args.host, args.port)?;

    tracing::info!("+----------------------------------------------------+");
    tracing::info!("|                 clara-proxy v{:<10}              |", env!("CARGO_PKG_VERSION"));
    tracing::info!("+----------------------------------------------------+");
    tracing::info!("|  pub:     tcp://{}:{:<10}             |", address.host(), address.pub_port());
    tracing::info!("|  sub:     tcp://{}:{:<10}             |", address.host(), address.sub_port());
    tracing::info!("|  control: tcp://{}:{:<10}             |", address.host(), address.control_port());
    tracing::info!("+----------------------------------------------------+");

    let mut proxy = Proxy::new(address);
    proxy.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    tracing::info!("proxy running, press Ctrl+C to stop");
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(200));
    }

    tracing::info!("shutdown signal received, stopping proxy");
    proxy.stop();
    Ok(())
}
