// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Actor` façade: a named participant that publishes, subscribes and
//! registers through a default proxy/registrar pair (§4.7).

use std::time::{Duration, Instant};

use crate::address::{ProxyAddress, RegAddress};
use crate::error::{ClaraMsgError, Result};
use crate::message::Message;
use crate::pool::{self, ScopedConnection};
use crate::registrar::{OwnerType, Registration};
use crate::subscription::{Callback, Subscription};
use crate::topic::Topic;
use crate::util;

/// Interval at which [`Actor::sync_publish`] polls for a reply, per §4.7.
const SYNC_POLL_INTERVAL_MS: u64 = 10;

/// A named participant owning a default proxy address and registrar
/// address. An `Actor` is cheap to clone-by-reference (it holds no
/// sockets itself — every operation borrows this thread's
/// [`pool::ConnectionPool`] fresh) so the same `Actor` value can be shared
/// across threads; each thread's calls still land on that thread's own
/// pooled connections.
pub struct Actor {
    name: String,
    identity: String,
    default_proxy: ProxyAddress,
    default_registrar: RegAddress,
}

impl Actor {
    /// Builds an actor whose registrar defaults to the proxy's host on the
    /// standard registrar port.
    pub fn new(name: impl Into<String>, default_proxy: ProxyAddress) -> Result<Actor> {
        let registrar = RegAddress::new(default_proxy.host())?;
        Ok(Actor::with_registrar(name, default_proxy, registrar))
    }

    pub fn with_registrar(
        name: impl Into<String>,
        default_proxy: ProxyAddress,
        default_registrar: RegAddress,
    ) -> Actor {
        let name = name.into();
        let identity = util::encode_identity(default_proxy.host(), &name);
        Actor {
            name,
            identity,
            default_proxy,
            default_registrar,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// This actor's deterministic 8-hex-digit identity (§3).
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn default_proxy(&self) -> &ProxyAddress {
        &self.default_proxy
    }

    pub fn default_registrar(&self) -> &RegAddress {
        &self.default_registrar
    }

    /// Leases a connection to this actor's default proxy from the calling
    /// thread's pool, connecting and handshaking if none is idle.
    pub fn connect(&self) -> Result<ScopedConnection> {
        self.connect_to(self.default_proxy.clone())
    }

    /// Leases a connection to an explicit proxy address.
    pub fn connect_to(&self, addr: ProxyAddress) -> Result<ScopedConnection> {
        pool::thread_local_pool().get_connection(addr)
    }

    /// Publishes `msg` on `conn` and returns immediately. FIFO per
    /// connection; unordered across connections.
    pub fn publish(&self, conn: &ScopedConnection, msg: &Message) -> Result<()> {
        conn.send(msg)
    }

    /// Publishes `msg` and blocks for a reply on a freshly minted reply-to
    /// topic, up to `timeout_ms`, polling every 10 ms (§4.7). The SUB
    /// filter for the reply-to topic is always removed before returning,
    /// success or not.
    pub fn sync_publish(
        &self,
        conn: &ScopedConnection,
        mut msg: Message,
        timeout_ms: u64,
    ) -> Result<Message> {
        let reply_to = util::next_reply_to(&self.identity);
        let reply_topic = Topic::raw(reply_to.clone());
        conn.subscribe(&reply_topic)?;

        let outcome = self.sync_publish_inner(conn, &mut msg, &reply_to, timeout_ms);

        if let Err(e) = conn.unsubscribe(&reply_topic) {
            tracing::warn!(error = %e, reply_to, "failed to clear sync-publish reply filter");
        }
        outcome
    }

    fn sync_publish_inner(
        &self,
        conn: &ScopedConnection,
        msg: &mut Message,
        reply_to: &str,
        timeout_ms: u64,
    ) -> Result<Message> {
        msg.meta_mut().replyto = Some(reply_to.to_string());
        conn.send(msg)?;

        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Some(reply) = conn.poll_recv(SYNC_POLL_INTERVAL_MS as i64)? {
                if reply.topic().as_str() == reply_to {
                    return Ok(reply);
                }
                tracing::debug!(
                    reply_to,
                    got = reply.topic().as_str(),
                    "discarding stale message while awaiting sync-publish reply"
                );
            }
            if Instant::now() >= deadline {
                return Err(ClaraMsgError::Timeout(timeout_ms));
            }
        }
    }

    /// Runs the subscribe handshake on `conn` and spawns a background
    /// worker dispatching matching messages to `callback` (§4.6). Takes
    /// ownership of the leased connection for the subscription's lifetime;
    /// [`Actor::unsubscribe`] returns it to this thread's pool.
    pub fn subscribe(
        &self,
        topic: Topic,
        conn: ScopedConnection,
        callback: Callback,
    ) -> Result<Subscription> {
        Subscription::start(conn.into_connection(), topic, callback)
    }

    /// Stops and joins `sub`'s worker, then returns its connection to the
    /// calling thread's pool.
    pub fn unsubscribe(&self, mut sub: Subscription) {
        if let Some(conn) = sub.stop() {
            pool::thread_local_pool().release_connection(conn);
        }
    }

    /// Registers this actor as a publisher of `topic` with the registrar at
    /// `self.default_registrar`.
    pub fn register_as_publisher(&self, topic: Topic, description: impl Into<String>) -> Result<()> {
        self.register(topic, description, OwnerType::Publisher)
    }

    pub fn register_as_subscriber(&self, topic: Topic, description: impl Into<String>) -> Result<()> {
        self.register(topic, description, OwnerType::Subscriber)
    }

    fn register(&self, topic: Topic, description: impl Into<String>, owner: OwnerType) -> Result<()> {
        let reg = Registration::new(self.name.clone(), description, &self.default_proxy, topic, owner);
        let driver = pool::thread_local_pool().get_registrar(self.default_registrar.clone())?;
        driver.add(&self.name, &reg, crate::registrar::constants::DEFAULT_TIMEOUT_MS)
    }

    pub fn deregister_as_publisher(&self, topic: Topic) -> Result<()> {
        self.deregister(topic, OwnerType::Publisher)
    }

    pub fn deregister_as_subscriber(&self, topic: Topic) -> Result<()> {
        self.deregister(topic, OwnerType::Subscriber)
    }

    fn deregister(&self, topic: Topic, owner: OwnerType) -> Result<()> {
        let reg = Registration::new(self.name.clone(), "", &self.default_proxy, topic, owner);
        let driver = pool::thread_local_pool().get_registrar(self.default_registrar.clone())?;
        driver.remove(&self.name, &reg, crate::registrar::constants::DEFAULT_TIMEOUT_MS)
    }

    /// Finds publishers whose topic `Q.is_parent(T)` for the query topic
    /// `Q` (§4.5's publisher-find asymmetry).
    pub fn find_publishers(&self, topic: Topic) -> Result<Vec<Registration>> {
        self.find(topic, OwnerType::Publisher)
    }

    /// Finds subscribers whose topic is a parent of the query topic.
    pub fn find_subscribers(&self, topic: Topic) -> Result<Vec<Registration>> {
        self.find(topic, OwnerType::Subscriber)
    }

    fn find(&self, topic: Topic, owner: OwnerType) -> Result<Vec<Registration>> {
        let driver = pool::thread_local_pool().get_registrar(self.default_registrar.clone())?;
        driver.find(&self.name, owner, topic, crate::registrar::constants::DEFAULT_TIMEOUT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_deterministic_in_shape() {
        let proxy = ProxyAddress::new("10.2.9.1").unwrap();
        let actor = Actor::new("asimov", proxy).unwrap();
        assert_eq!(actor.identity().len(), 8);
        assert!(actor.identity().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn default_registrar_uses_proxy_host() {
        let proxy = ProxyAddress::new("10.2.9.1").unwrap();
        let actor = Actor::new("asimov", proxy).unwrap();
        assert_eq!(actor.default_registrar().host(), "10.2.9.1");
        assert_eq!(
            actor.default_registrar().port(),
            crate::address::DEFAULT_REGISTRAR_PORT
        );
    }
}
