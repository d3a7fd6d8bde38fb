// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-thread cache of [`Connection`]s and [`RegDriver`]s keyed by address,
//! with move-only scoped leases (§4.4).

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::address::{ProxyAddress, RegAddress};
use crate::connection::setup::{ConnectionSetup, DefaultConnectionSetup};
use crate::connection::Connection;
use crate::error::Result;
use crate::registrar::driver::RegDriver;

struct Cache<A, U> {
    idle: HashMap<A, VecDeque<U>>,
}

impl<A: std::hash::Hash + Eq + Clone, U> Cache<A, U> {
    fn new() -> Self {
        Cache {
            idle: HashMap::new(),
        }
    }

    fn pop(&mut self, addr: &A) -> Option<U> {
        self.idle.get_mut(addr).and_then(VecDeque::pop_front)
    }

    fn push(&mut self, addr: A, value: U) {
        self.idle.entry(addr).or_default().push_back(value);
    }
}

/// Per-thread connection and registrar-driver cache. Actors obtain one via
/// [`thread_local_pool`] so that sockets — never safe to share across
/// threads — stay confined to the thread that created them.
///
/// Leases hold an owned `Arc<ConnectionPool>` clone rather than borrowing
/// `&ConnectionPool`, so a [`crate::actor::Actor`] method can fetch this
/// thread's pool and return a lease from the same call without tying its
/// lifetime to a local variable.
pub struct ConnectionPool {
    ctx: Arc<zmq::Context>,
    proxy_cache: RefCell<Cache<ProxyAddress, Connection>>,
    reg_cache: RefCell<Cache<RegAddress, RegDriver>>,
    setup: RefCell<Arc<dyn ConnectionSetup>>,
}

impl ConnectionPool {
    pub fn new(ctx: Arc<zmq::Context>) -> ConnectionPool {
        ConnectionPool {
            ctx,
            proxy_cache: RefCell::new(Cache::new()),
            reg_cache: RefCell::new(Cache::new()),
            setup: RefCell::new(Arc::new(DefaultConnectionSetup)),
        }
    }

    /// Replaces the pre/post-connection hook used for subsequently created
    /// connections; connections already leased out are unaffected.
    pub fn set_default_setup(&self, setup: Arc<dyn ConnectionSetup>) {
        *self.setup.borrow_mut() = setup;
    }

    /// Pops an idle connection to `addr`, or creates (and handshakes) one.
    pub fn get_connection(self: Arc<Self>, addr: ProxyAddress) -> Result<ScopedConnection> {
        if let Some(conn) = self.proxy_cache.borrow_mut().pop(&addr) {
            return Ok(ScopedConnection::new(self, conn));
        }
        let setup = self.setup.borrow().clone();
        let conn = Connection::connect(&self.ctx, addr, setup.as_ref())?;
        Ok(ScopedConnection::new(self, conn))
    }

    /// Pops an idle registrar driver for `addr`, or connects one.
    pub fn get_registrar(self: Arc<Self>, addr: RegAddress) -> Result<ScopedRegDriver> {
        if let Some(driver) = self.reg_cache.borrow_mut().pop(&addr) {
            return Ok(ScopedRegDriver::new(self, driver));
        }
        let driver = RegDriver::connect(&self.ctx, addr)?;
        Ok(ScopedRegDriver::new(self, driver))
    }

    fn recycle_connection(&self, conn: Connection) {
        self.proxy_cache
            .borrow_mut()
            .push(conn.address().clone(), conn);
    }

    fn recycle_registrar(&self, driver: RegDriver) {
        self.reg_cache
            .borrow_mut()
            .push(driver.address().clone(), driver);
    }

    /// Returns a `Connection` taken out of a lease (e.g. one handed back by
    /// a stopped [`crate::subscription::Subscription`]) to this pool's idle
    /// cache, without going through a fresh [`ScopedConnection`].
    pub(crate) fn release_connection(&self, conn: Connection) {
        self.recycle_connection(conn);
    }
}

thread_local! {
    static THREAD_POOL: RefCell<Option<Arc<ConnectionPool>>> = const { RefCell::new(None) };
}

/// Returns this thread's `ConnectionPool`, creating one against the shared
/// transport context on first use. Every thread gets its own pool, never a
/// shared one — the only safe way to use a pool since sockets are not
/// themselves thread-safe.
pub fn thread_local_pool() -> Arc<ConnectionPool> {
    THREAD_POOL.with(|cell| {
        cell.borrow_mut()
            .get_or_insert_with(|| Arc::new(ConnectionPool::new(crate::context::instance())))
            .clone()
    })
}

/// A move-only lease on a pooled [`Connection`]. Recycles into the owning
/// pool's cache on drop unless [`ScopedConnection::close`] was called or the
/// connection was taken out via [`ScopedConnection::into_connection`].
pub struct ScopedConnection {
    pool: Arc<ConnectionPool>,
    conn: Option<Connection>,
}

impl ScopedConnection {
    fn new(pool: Arc<ConnectionPool>, conn: Connection) -> Self {
        ScopedConnection {
            pool,
            conn: Some(conn),
        }
    }

    pub fn address(&self) -> &ProxyAddress {
        self.conn.as_ref().expect("connection taken").address()
    }

    /// Discards the connection instead of recycling it, e.g. after an error
    /// that leaves the socket in a bad state.
    pub fn close(mut self) {
        self.conn.take();
    }

    /// Takes the underlying `Connection` out of this lease without
    /// recycling it, for a caller (e.g. [`crate::actor::Actor::subscribe`])
    /// that hands it off to own its lifetime directly, such as a
    /// [`crate::subscription::Subscription`] worker thread.
    pub fn into_connection(mut self) -> Connection {
        self.conn.take().expect("connection taken")
    }
}

impl std::ops::Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection taken")
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.recycle_connection(conn);
        }
    }
}

/// A move-only lease on a pooled [`RegDriver`], analogous to
/// [`ScopedConnection`].
pub struct ScopedRegDriver {
    pool: Arc<ConnectionPool>,
    driver: Option<RegDriver>,
}

impl ScopedRegDriver {
    fn new(pool: Arc<ConnectionPool>, driver: RegDriver) -> Self {
        ScopedRegDriver {
            pool,
            driver: Some(driver),
        }
    }

    pub fn close(mut self) {
        self.driver.take();
    }
}

impl std::ops::Deref for ScopedRegDriver {
    type Target = RegDriver;

    fn deref(&self) -> &RegDriver {
        self.driver.as_ref().expect("driver taken")
    }
}

impl Drop for ScopedRegDriver {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            self.pool.recycle_registrar(driver);
        }
    }
}
