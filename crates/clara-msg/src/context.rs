// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The shared transport context. Exactly one process-wide `zmq::Context` is
//! used by default; tests may create private ones.

use std::sync::{Arc, OnceLock};

static SHARED: OnceLock<Arc<zmq::Context>> = OnceLock::new();

/// Lazily-created, reference-counted, process-wide transport context.
/// Every [`crate::pool::ConnectionPool`] and [`crate::proxy::Proxy`] uses
/// this unless constructed with [`create`] for test isolation.
pub fn instance() -> Arc<zmq::Context> {
    SHARED
        .get_or_init(|| Arc::new(zmq::Context::new()))
        .clone()
}

/// A fresh, private context, independent of the process-wide singleton.
/// Intended for tests that need isolated shutdown without affecting other
/// connections in the same process.
pub fn create() -> Arc<zmq::Context> {
    Arc::new(zmq::Context::new())
}

/// Sets the number of IO threads used by the shared context. Only
/// meaningful before the first socket is created on it.
pub fn set_io_threads(ctx: &zmq::Context, threads: i32) -> crate::error::Result<()> {
    ctx.set_io_threads(threads)?;
    Ok(())
}

pub fn io_threads(ctx: &zmq::Context) -> crate::error::Result<i32> {
    Ok(ctx.get_io_threads()?)
}

pub fn set_max_sockets(ctx: &zmq::Context, max: i32) -> crate::error::Result<()> {
    ctx.set_max_sockets(max)?;
    Ok(())
}

pub fn max_sockets(ctx: &zmq::Context) -> crate::error::Result<i32> {
    Ok(ctx.get_max_sockets()?)
}
