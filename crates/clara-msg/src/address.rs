// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Proxy and registrar endpoint addresses.

use std::net::ToSocketAddrs;

use crate::error::{ClaraMsgError, Result};
use crate::util;

/// Ports below this are privileged and rejected, matching the original's
/// `privileged_ports` constant.
const PRIVILEGED_PORTS: u16 = 1024;

/// Default XPUB port of a proxy; `sub_port` is always `pub_port + 1`.
pub const DEFAULT_PROXY_PORT: u16 = 7771;

/// Default registrar service port.
pub const DEFAULT_REGISTRAR_PORT: u16 = 8888;

fn check_port(port: u16) -> Result<()> {
    if port < PRIVILEGED_PORTS {
        return Err(ClaraMsgError::InvalidArgument(format!(
            "port {port} is in the privileged range (<{PRIVILEGED_PORTS})"
        )));
    }
    Ok(())
}

/// Resolves `host` to a dotted-quad IPv4 string unless it already is one.
fn resolve_host(host: &str) -> Result<String> {
    if util::is_ipaddr(host) {
        return Ok(host.to_string());
    }
    let lookup = if host == "localhost" {
        util::localhost()
    } else {
        format!("{host}:0")
            .to_socket_addrs()
            .ok()
            .and_then(|mut it| it.next())
            .map(|a| a.ip().to_string())
            .ok_or_else(|| ClaraMsgError::InvalidArgument(format!("cannot resolve host {host}")))?
    };
    Ok(lookup)
}

/// `{host, pub_port, sub_port}` of a proxy broker. `sub_port` is always
/// `pub_port + 1` — not independently configurable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyAddress {
    host: String,
    pub_port: u16,
    sub_port: u16,
}

impl ProxyAddress {
    pub fn new(host: &str) -> Result<ProxyAddress> {
        Self::with_port(host, DEFAULT_PROXY_PORT)
    }

    pub fn with_port(host: &str, pub_port: u16) -> Result<ProxyAddress> {
        check_port(pub_port)?;
        let sub_port = pub_port
            .checked_add(1)
            .ok_or_else(|| ClaraMsgError::InvalidArgument("pub_port overflow".into()))?;
        check_port(sub_port)?;
        Ok(ProxyAddress {
            host: resolve_host(host)?,
            pub_port,
            sub_port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn pub_port(&self) -> u16 {
        self.pub_port
    }

    pub fn sub_port(&self) -> u16 {
        self.sub_port
    }

    /// Control channel port, `sub_port + 1` per §4.2.
    pub fn control_port(&self) -> u16 {
        self.sub_port + 1
    }
}

impl std::fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.pub_port)
    }
}

/// `{host, port}` of a registrar service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegAddress {
    host: String,
    port: u16,
}

impl RegAddress {
    pub fn new(host: &str) -> Result<RegAddress> {
        Self::with_port(host, DEFAULT_REGISTRAR_PORT)
    }

    pub fn with_port(host: &str, port: u16) -> Result<RegAddress> {
        check_port(port)?;
        Ok(RegAddress {
            host: resolve_host(host)?,
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl std::fmt::Display for RegAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_address_parity() {
        let a = ProxyAddress::with_port("10.2.9.1", 7771).unwrap();
        assert_eq!(a.sub_port(), a.pub_port() + 1);
        assert_eq!(a.control_port(), a.pub_port() + 2);
    }

    #[test]
    fn rejects_privileged_port() {
        assert!(ProxyAddress::with_port("10.2.9.1", 80).is_err());
    }

    #[test]
    fn reg_address_default_port() {
        let a = RegAddress::new("10.2.9.1").unwrap();
        assert_eq!(a.port(), DEFAULT_REGISTRAR_PORT);
    }

    #[test]
    fn ip_host_passes_through_unresolved() {
        let a = ProxyAddress::new("10.2.9.1").unwrap();
        assert_eq!(a.host(), "10.2.9.1");
    }
}
