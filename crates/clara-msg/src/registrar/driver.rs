// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client stub speaking the registrar's request/response protocol (§4.5).
//! Never retries; timeout and protocol-violation errors are surfaced to the
//! caller, which decides whether to retry (§7).

use prost::Message as _;

use super::constants;
use super::{OwnerType, Registration};
use crate::address::RegAddress;
use crate::error::{ClaraMsgError, Result};
use crate::proto;

/// A connected REQ socket talking to one registrar service.
pub struct RegDriver {
    socket: zmq::Socket,
    address: RegAddress,
}

impl RegDriver {
    pub fn connect(ctx: &zmq::Context, address: RegAddress) -> Result<RegDriver> {
        let socket = ctx.socket(zmq::REQ)?;
        socket.set_rcvhwm(0)?;
        socket.set_sndhwm(0)?;
        socket.connect(&format!("tcp://{}:{}", address.host(), address.port()))?;
        Ok(RegDriver { socket, address })
    }

    pub fn address(&self) -> &RegAddress {
        &self.address
    }

    pub fn add(&self, sender: &str, reg: &Registration, timeout_ms: u64) -> Result<()> {
        let action = match reg.owner_type {
            OwnerType::Publisher => constants::REGISTER_PUBLISHER,
            OwnerType::Subscriber => constants::REGISTER_SUBSCRIBER,
        };
        self.request(action, sender, reg, timeout_ms).map(|_| ())
    }

    pub fn remove(&self, sender: &str, reg: &Registration, timeout_ms: u64) -> Result<()> {
        let action = match reg.owner_type {
            OwnerType::Publisher => constants::REMOVE_PUBLISHER_REGISTRATION,
            OwnerType::Subscriber => constants::REMOVE_SUBSCRIBER_REGISTRATION,
        };
        self.request(action, sender, reg, timeout_ms).map(|_| ())
    }

    /// Removes every registration for `host` with the given owner type.
    /// Issues one request; the caller calls it twice (once per owner type)
    /// to mirror the original's `remove_all(sender, host)` behavior, which
    /// is two separate filtered requests.
    pub fn remove_all(
        &self,
        sender: &str,
        host: &str,
        owner_type: OwnerType,
        timeout_ms: u64,
    ) -> Result<()> {
        let filter = Registration {
            name: String::new(),
            description: String::new(),
            host: host.to_string(),
            port: 0,
            topic: crate::topic::Topic::raw(""),
            owner_type,
        };
        self.request(constants::REG_REMOVE_ALL, sender, &filter, timeout_ms)
            .map(|_| ())
    }

    pub fn find(
        &self,
        sender: &str,
        owner_type: OwnerType,
        query_topic: crate::topic::Topic,
        timeout_ms: u64,
    ) -> Result<Vec<Registration>> {
        let action = match owner_type {
            OwnerType::Publisher => constants::FIND_PUBLISHER,
            OwnerType::Subscriber => constants::FIND_SUBSCRIBER,
        };
        let query = Registration {
            name: String::new(),
            description: String::new(),
            host: String::new(),
            port: 0,
            topic: query_topic,
            owner_type,
        };
        self.request(action, sender, &query, timeout_ms)
    }

    fn request(
        &self,
        action: &str,
        sender: &str,
        reg: &Registration,
        timeout_ms: u64,
    ) -> Result<Vec<Registration>> {
        let frames = [
            action.as_bytes().to_vec(),
            sender.as_bytes().to_vec(),
            reg.to_proto().encode_to_vec(),
        ];
        self.socket.send_multipart(frames, 0)?;

        match self.socket.poll(zmq::POLLIN, timeout_ms as i64) {
            Ok(n) if n > 0 => {}
            Ok(_) => return Err(ClaraMsgError::Timeout(timeout_ms)),
            Err(zmq::Error::ETERM) => return Err(ClaraMsgError::TransportTerminated),
            Err(e) => return Err(e.into()),
        }

        let reply = self.socket.recv_multipart(0)?;
        if reply.len() < 3 {
            return Err(ClaraMsgError::ProtocolViolation(format!(
                "expected >=3 response frames, got {}",
                reply.len()
            )));
        }
        let status = String::from_utf8_lossy(&reply[2]);
        if status != constants::SUCCESS {
            return Err(ClaraMsgError::ProtocolViolation(status.into_owned()));
        }

        reply[3..]
            .iter()
            .map(|bytes| {
                proto::Registration::decode(bytes.as_slice())
                    .map(|r| Registration::from_proto(&r))
                    .map_err(ClaraMsgError::from)
            })
            .collect()
    }
}
