// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XSUB/XPUB forwarder plus its control channel (§4.2). Two cooperating
//! threads on a shared transport context: the built-in forwarder loop, and
//! a control plane that answers the connect/subscribe/reply handshakes.

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::address::ProxyAddress;
use crate::connection::{CTRL_CONNECT, CTRL_REPLY, CTRL_SUBSCRIBE, CTRL_TOPIC};
use crate::error::{ClaraMsgError, Result};

/// Stopped -> Running -> Stopped. A `Proxy` may be started and stopped at
/// most once each; create a new instance to run again.
pub struct Proxy {
    address: ProxyAddress,
    ctx: Arc<zmq::Context>,
    forwarder: Option<JoinHandle<()>>,
    control: Option<JoinHandle<()>>,
}

impl Proxy {
    pub fn new(address: ProxyAddress) -> Proxy {
        Proxy {
            address,
            ctx: crate::context::instance(),
            forwarder: None,
            control: None,
        }
    }

    pub fn with_context(address: ProxyAddress, ctx: Arc<zmq::Context>) -> Proxy {
        Proxy {
            address,
            ctx,
            forwarder: None,
            control: None,
        }
    }

    pub fn address(&self) -> &ProxyAddress {
        &self.address
    }

    /// Binds XSUB/XPUB and the control sockets, then spawns both threads.
    pub fn start(&mut self) -> Result<()> {
        let xsub = self.ctx.socket(zmq::XSUB)?;
        xsub.set_rcvhwm(0)?;
        xsub.set_sndhwm(0)?;
        xsub.bind(&format!("tcp://{}:{}", self.address.host(), self.address.pub_port()))?;

        let xpub = self.ctx.socket(zmq::XPUB)?;
        xpub.set_rcvhwm(0)?;
        xpub.set_sndhwm(0)?;
        xpub.bind(&format!("tcp://{}:{}", self.address.host(), self.address.sub_port()))?;

        let address = self.address.clone();
        let forwarder = std::thread::Builder::new()
            .name(format!("clara-msg-proxy-fwd-{address}"))
            .spawn(move || {
                tracing::info!(%address, "proxy forwarder running");
                match zmq::proxy(&xsub, &xpub) {
                    Ok(()) => {}
                    Err(zmq::Error::ETERM) => {
                        tracing::info!(%address, "proxy forwarder context terminated, exiting");
                    }
                    Err(e) => {
                        tracing::warn!(%address, error = %e, "proxy forwarder error");
                    }
                }
            })
            .expect("failed to spawn proxy forwarder thread");

        let ctx = self.ctx.clone();
        let address = self.address.clone();
        let control = std::thread::Builder::new()
            .name(format!("clara-msg-proxy-ctrl-{address}"))
            .spawn(move || {
                if let Err(e) = run_control_plane(&ctx, &address) {
                    if !e.is_shutdown() {
                        tracing::warn!(%address, error = %e, "proxy control plane error");
                    }
                }
            })
            .expect("failed to spawn proxy control thread");

        self.forwarder = Some(forwarder);
        self.control = Some(control);
        Ok(())
    }

    /// Tears the shared context down, which causes both threads to exit
    /// their recv loops with a terminated-context error (logged, not
    /// propagated), then joins them.
    pub fn stop(&mut self) {
        // Dropping every socket handle this Proxy itself created happens
        // implicitly; destroying the context is what actually unblocks the
        // forwarder and control threads, which hold their own socket
        // clones via `Arc<zmq::Context>`.
        self.ctx.shutdown().ok();
        if let Some(handle) = self.forwarder.take() {
            handle.join().expect("proxy forwarder thread panicked");
        }
        if let Some(handle) = self.control.take() {
            handle.join().expect("proxy control thread panicked");
        }
        tracing::info!(address = %self.address, "proxy stopped");
    }
}

impl Drop for Proxy {
    fn drop(&mut self) {
        if self.forwarder.is_some() || self.control.is_some() {
            self.stop();
        }
    }
}

fn run_control_plane(ctx: &zmq::Context, address: &ProxyAddress) -> Result<()> {
    let router = ctx.socket(zmq::ROUTER)?;
    router.bind(&format!("tcp://{}:{}", address.host(), address.control_port()))?;
    // Lets a client reconnecting with the same DEALER identity (e.g. after a
    // transient network blip) take over its old routing slot instead of
    // being silently dropped.
    router.set_router_handover(true)?;

    let sub = ctx.socket(zmq::SUB)?;
    sub.connect(&format!("tcp://{}:{}", address.host(), address.sub_port()))?;
    sub.set_subscribe(CTRL_TOPIC.as_bytes())?;

    let pub_socket = ctx.socket(zmq::PUB)?;
    pub_socket.connect(&format!("tcp://{}:{}", address.host(), address.pub_port()))?;

    loop {
        match sub.poll(zmq::POLLIN, 100) {
            Ok(n) if n > 0 => {}
            Ok(_) => continue,
            Err(zmq::Error::ETERM) => return Err(ClaraMsgError::TransportTerminated),
            Err(e) => return Err(e.into()),
        }

        let frames = match sub.recv_multipart(0) {
            Ok(f) => f,
            Err(zmq::Error::ETERM) => return Err(ClaraMsgError::TransportTerminated),
            Err(e) => return Err(e.into()),
        };

        let [_topic, ctrl_type, identity] = frames.as_slice() else {
            tracing::warn!(
                frames = frames.len(),
                "malformed control message, expected 3 frames"
            );
            continue;
        };
        let ctrl_type = String::from_utf8_lossy(ctrl_type).into_owned();

        match ctrl_type.as_str() {
            CTRL_CONNECT => {
                if let Err(e) =
                    router.send_multipart([identity.as_slice(), CTRL_CONNECT.as_bytes()], 0)
                {
                    tracing::warn!(error = %e, "control plane pub ack failed");
                }
            }
            CTRL_SUBSCRIBE => {
                if let Err(e) =
                    pub_socket.send_multipart([identity.as_slice(), CTRL_SUBSCRIBE.as_bytes()], 0)
                {
                    tracing::warn!(error = %e, "control plane sub ack failed");
                }
            }
            CTRL_REPLY => {
                if let Err(e) =
                    router.send_multipart([identity.as_slice(), CTRL_REPLY.as_bytes()], 0)
                {
                    tracing::warn!(error = %e, "control plane rep ack failed");
                }
            }
            other => {
                tracing::warn!(ctrl_type = other, "unknown control message type");
            }
        }
    }
}
