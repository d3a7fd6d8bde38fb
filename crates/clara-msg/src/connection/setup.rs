// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pre/post-connection socket option hooks (§4.3 step 2, §4.4
//! `set_default_setup`).

/// A thin wrapper over a raw socket exposing just the option knobs a
/// [`ConnectionSetup`] needs, so hooks don't depend on which of pub/sub/ctrl
/// they're adjusting.
pub struct SocketSetup<'a> {
    socket: &'a zmq::Socket,
}

impl<'a> SocketSetup<'a> {
    pub(crate) fn new(socket: &'a zmq::Socket) -> SocketSetup<'a> {
        SocketSetup { socket }
    }

    pub fn set_send_hwm(&self, hwm: i32) -> crate::error::Result<()> {
        self.socket.set_sndhwm(hwm)?;
        Ok(())
    }

    pub fn set_recv_hwm(&self, hwm: i32) -> crate::error::Result<()> {
        self.socket.set_rcvhwm(hwm)?;
        Ok(())
    }

    pub fn set_linger(&self, millis: i32) -> crate::error::Result<()> {
        self.socket.set_linger(millis)?;
        Ok(())
    }

    pub fn socket_type(&self) -> crate::error::Result<zmq::SocketType> {
        Ok(self.socket.get_socket_type()?)
    }
}

/// Hook invoked by the [`crate::pool::ConnectionPool`] around every new
/// connection's setup. Default behavior (applied before any user hook) sets
/// HWM=0 on pub and sub sockets per §4.3; override to customize.
pub trait ConnectionSetup: Send + Sync {
    /// Called once per socket (pub, then sub) before it connects.
    fn pre_connection(&self, _socket: &SocketSetup<'_>) -> crate::error::Result<()> {
        Ok(())
    }

    /// Called once after pub, sub and ctrl have all connected and the
    /// handshake has succeeded.
    fn post_connection(&self) {}
}

/// The no-op default: HWM=0 is already applied unconditionally by
/// [`crate::connection::Connection::connect`] before this hook runs, so
/// there is nothing left for the default setup to do.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConnectionSetup;

impl ConnectionSetup for DefaultConnectionSetup {}
