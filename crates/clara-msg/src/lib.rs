// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # clara-msg
//!
//! A distributed actor framework built on a brokered pub/sub messaging
//! substrate: a proxy (XSUB/XPUB broker with a control channel), a
//! connection pool, a registrar for topic-based discovery, and the
//! [`Actor`] façade that ties them together.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use clara_msg::{Actor, ProxyAddress, Topic};
//!
//! # fn main() -> clara_msg::error::Result<()> {
//! let actor = Actor::new("asimov", ProxyAddress::new("10.2.9.1")?)?;
//! let topic = Topic::build("writer")?;
//!
//! let conn = actor.connect()?;
//! actor.publish(&conn, &clara_msg::make_message(topic, &42i32))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! user code -> Actor -> ConnectionPool -> Connection -> Proxy <-> peer Connection
//!                                                                -> peer Subscription -> callback
//!           -> Actor -> ConnectionPool -> RegDriver -> RegistrarService
//! ```
//!
//! | Module | Role |
//! |---|---|
//! | [`topic`] | Hierarchical `domain[:subject[:type]]` routing key |
//! | [`address`] | `ProxyAddress`/`RegAddress` endpoint types |
//! | [`message`] | `{topic, meta, data}` envelope and typed payload helpers |
//! | [`proxy`] | XSUB/XPUB forwarder and control plane |
//! | [`connection`] | Per-proxy socket bundle and its control handshakes |
//! | [`pool`] | Thread-local connection/registrar-driver cache |
//! | [`registrar`] | In-memory topic registry, its driver and wire service |
//! | [`subscription`] | Background receiver loop bound to one topic |
//! | [`actor`] | The publish/subscribe/sync-publish/register façade |
//!
//! This crate never persists state, never authenticates peers, and never
//! federates registrars or proxies across processes. Delivery is best
//! effort: the transport does not retry or acknowledge beyond the
//! connect/subscribe handshakes.

pub mod actor;
pub mod address;
pub mod connection;
pub mod context;
pub mod error;
pub mod message;
pub mod pool;
pub mod proto;
pub mod proxy;
pub mod registrar;
pub mod subscription;
pub mod topic;
pub mod util;

pub use actor::Actor;
pub use address::{ProxyAddress, RegAddress};
pub use error::{ClaraMsgError, Result};
pub use message::{make_message, make_response, make_string_message, parse_message, Message};
pub use proto::Meta;
pub use subscription::Subscription;
pub use topic::Topic;
