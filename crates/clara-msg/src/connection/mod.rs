// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! A proxy connection: the (pub, sub, ctrl) socket bundle bound to one
//! [`ProxyAddress`], plus its connect/subscribe control handshakes (§4.3).

pub mod setup;

use prost::Message as _;

use crate::address::ProxyAddress;
use crate::error::{ClaraMsgError, Result};
use crate::message::Message;
use crate::proto;
use crate::topic::Topic;
use setup::{ConnectionSetup, SocketSetup};

/// Reserved control-channel topic (§4.2, §6).
pub const CTRL_TOPIC: &str = "clara:msg:control";
pub const CTRL_CONNECT: &str = "pub";
pub const CTRL_SUBSCRIBE: &str = "sub";
pub const CTRL_REPLY: &str = "rep";

const CONNECT_MAX_RETRIES: u32 = 10;
const CONNECT_POLL_TIMEOUT_MS: i64 = 100;
const SUBSCRIBE_MAX_RETRIES: u32 = 10;
const SUBSCRIBE_POLL_TIMEOUT_MS: i64 = 100;

/// A raw, up-to-3-frame message read off a sub socket, before topic/meta/
/// payload parsing. More than 3 frames is always a protocol violation;
/// fewer than 3 is tolerated only by callers that expect a short control
/// reply (the sync-publish/subscribe handshakes).
pub struct RawMessage {
    pub frames: Vec<Vec<u8>>,
}

impl RawMessage {
    fn recv(socket: &zmq::Socket) -> Result<RawMessage> {
        let frames = socket.recv_multipart(0)?;
        if frames.len() > 3 {
            return Err(ClaraMsgError::ProtocolViolation(format!(
                "expected at most 3 frames, got {}",
                frames.len()
            )));
        }
        Ok(RawMessage { frames })
    }
}

/// The (pub, sub, ctrl) bundle for one proxy endpoint, owned by exactly one
/// thread at a time (enforced by [`crate::pool::ConnectionPool`]'s
/// move-only leases, not by this type itself).
pub struct Connection {
    address: ProxyAddress,
    pub_socket: zmq::Socket,
    sub_socket: zmq::Socket,
    ctrl_socket: zmq::Socket,
    local_id: String,
}

impl Connection {
    /// Opens and fully handshakes a connection to `address`.
    pub fn connect(
        ctx: &zmq::Context,
        address: ProxyAddress,
        setup: &dyn ConnectionSetup,
    ) -> Result<Connection> {
        let local_id = crate::util::control_id().to_string();

        let pub_socket = ctx.socket(zmq::PUB)?;
        let sub_socket = ctx.socket(zmq::SUB)?;
        let ctrl_socket = ctx.socket(zmq::DEALER)?;

        for socket in [&pub_socket, &sub_socket] {
            socket.set_sndhwm(0)?;
            socket.set_rcvhwm(0)?;
            setup.pre_connection(&SocketSetup::new(socket))?;
        }
        ctrl_socket.set_identity(local_id.as_bytes())?;

        pub_socket.connect(&format!("tcp://{}:{}", address.host(), address.pub_port()))?;
        sub_socket.connect(&format!("tcp://{}:{}", address.host(), address.sub_port()))?;
        ctrl_socket.connect(&format!("tcp://{}:{}", address.host(), address.control_port()))?;

        let conn = Connection {
            address,
            pub_socket,
            sub_socket,
            ctrl_socket,
            local_id,
        };
        conn.connect_handshake()?;
        setup.post_connection();
        Ok(conn)
    }

    fn connect_handshake(&self) -> Result<()> {
        for attempt in 0..CONNECT_MAX_RETRIES {
            self.pub_socket.send_multipart(
                [
                    CTRL_TOPIC.as_bytes(),
                    CTRL_CONNECT.as_bytes(),
                    self.local_id.as_bytes(),
                ],
                0,
            )?;
            match self.ctrl_socket.poll(zmq::POLLIN, CONNECT_POLL_TIMEOUT_MS) {
                Ok(n) if n > 0 => {
                    self.ctrl_socket.recv_multipart(0)?;
                    return Ok(());
                }
                Ok(_) => {
                    tracing::debug!(attempt, address = %self.address, "connect handshake retry");
                }
                Err(zmq::Error::ETERM) => return Err(ClaraMsgError::TransportTerminated),
                Err(e) => return Err(e.into()),
            }
        }
        Err(ClaraMsgError::ConnectionError(format!(
            "no control ack from proxy {} after {CONNECT_MAX_RETRIES} attempts",
            self.address
        )))
    }

    pub fn address(&self) -> &ProxyAddress {
        &self.address
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Publishes the three frames `[topic, meta, data]` atomically.
    pub fn send(&self, msg: &Message) -> Result<()> {
        self.pub_socket.send_multipart(
            [
                msg.topic().as_str().as_bytes().to_vec(),
                msg.meta().encode_to_vec(),
                msg.data().to_vec(),
            ],
            0,
        )?;
        Ok(())
    }

    /// Blocks until the next message arrives on the sub socket.
    pub fn recv(&self) -> Result<Message> {
        let raw = RawMessage::recv(&self.sub_socket)?;
        parse_message(raw)
    }

    /// Polls the sub socket for up to `timeout_ms`, returning `None` on
    /// timeout rather than blocking indefinitely.
    pub fn poll_recv(&self, timeout_ms: i64) -> Result<Option<Message>> {
        match self.sub_socket.poll(zmq::POLLIN, timeout_ms) {
            Ok(n) if n > 0 => Ok(Some(self.recv()?)),
            Ok(_) => Ok(None),
            Err(zmq::Error::ETERM) => Err(ClaraMsgError::TransportTerminated),
            Err(e) => Err(e.into()),
        }
    }

    /// Direct access to the underlying sub socket, for a [`crate::subscription::Subscription`]
    /// worker that needs to poll/recv in its own loop.
    pub(crate) fn sub_socket(&self) -> &zmq::Socket {
        &self.sub_socket
    }

    /// Sets the SUB filter then runs the subscribe handshake, retrying up
    /// to [`SUBSCRIBE_MAX_RETRIES`] times for a 2-frame reply.
    pub fn subscribe(&self, topic: &Topic) -> Result<()> {
        self.sub_socket.set_subscribe(topic.as_str().as_bytes())?;

        for attempt in 0..SUBSCRIBE_MAX_RETRIES {
            self.pub_socket.send_multipart(
                [
                    CTRL_TOPIC.as_bytes(),
                    CTRL_SUBSCRIBE.as_bytes(),
                    topic.as_str().as_bytes(),
                ],
                0,
            )?;
            match self.sub_socket.poll(zmq::POLLIN, SUBSCRIBE_POLL_TIMEOUT_MS) {
                Ok(n) if n > 0 => {
                    let frames = self.sub_socket.recv_multipart(0)?;
                    if frames.len() == 2 {
                        return Ok(());
                    }
                    tracing::warn!(
                        frames = frames.len(),
                        "unexpected frame count during subscribe handshake"
                    );
                }
                Ok(_) => {
                    tracing::debug!(attempt, topic = %topic, "subscribe handshake retry");
                }
                Err(zmq::Error::ETERM) => return Err(ClaraMsgError::TransportTerminated),
                Err(e) => return Err(e.into()),
            }
        }
        Err(ClaraMsgError::ConnectionError(format!(
            "no subscribe ack for topic {topic} after {SUBSCRIBE_MAX_RETRIES} attempts"
        )))
    }

    /// Clears the SUB filter. No handshake: unsubscribing is not
    /// acknowledged by the proxy.
    pub fn unsubscribe(&self, topic: &Topic) -> Result<()> {
        self.sub_socket.set_unsubscribe(topic.as_str().as_bytes())?;
        Ok(())
    }
}

/// Parses a 3-frame raw message into a [`Message`]. Exactly 3 frames is
/// required; the relaxed arities used by control handshakes are handled by
/// their own callers, never by this function.
pub fn parse_message(raw: RawMessage) -> Result<Message> {
    match raw.frames.as_slice() {
        [topic, meta, data] => {
            let topic = Topic::raw(String::from_utf8_lossy(topic).into_owned());
            let meta = proto::Meta::decode(meta.as_slice())?;
            Ok(Message::new(topic, meta, data.clone()))
        }
        other => Err(ClaraMsgError::ProtocolViolation(format!(
            "expected exactly 3 message frames, got {}",
            other.len()
        ))),
    }
}
