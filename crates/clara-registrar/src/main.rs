// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! clara-registrar — standalone in-memory registrar service (§4.5).
//!
//! # Usage
//!
//! ```bash
//! # Bind on all interfaces, default port 8888
//! clara-registrar
//!
//! # Custom host/port
//! clara-registrar --host 10.2.9.1 --port 8899
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use clara_msg::address::RegAddress;
use clara_msg::registrar::service::{self, RegDataSet};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// clara-msg registrar service
#[derive(Parser, Debug)]
#[command(name = "clara-registrar")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory topic registrar for clara-msg publisher/subscriber discovery")]
struct Args {
    /// Host to bind the registrar on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// REP port
    #[arg(short, long, default_value_t = clara_msg::address::DEFAULT_REGISTRAR_PORT)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let address = RegAddress::with_port(&args.host, args.port)?;

    tracing::info!("+----------------------------------------------------+");
    tracing::info!("|               clara-registrar v{:<10}           |", env!("CARGO_PKG_VERSION"));
    tracing::info!("+----------------------------------------------------+");
    tracing::info!("|  listen: tcp://{}:{:<10}              |", address.host(), address.port());
    tracing::info!("+----------------------------------------------------+");

    let store = Arc::new(Mutex::new(RegDataSet::new()));
    let alive = Arc::new(AtomicBool::new(true));

    let r = alive.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let ctx = clara_msg::context::instance();
    tracing::info!("registrar running, press Ctrl+C to stop");
    service::run(&ctx, &address, store, alive)?;

    tracing::info!("registrar stopped");
    Ok(())
}
