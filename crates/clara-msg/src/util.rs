// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host addressing helpers and the deterministic identity/reply-to
//! generators described in §3 of the data model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use parking_lot::RwLock;
use rand::Rng;

/// Language prefix used in control-id/random-id generation. `2` is this
/// implementation's slot in the original's per-language numbering.
const LANG_PREFIX: u32 = 2;

/// First value of the reply-to sequence window.
const REPLY_SEQ_BASE: u32 = 2_000_000;
/// Width of the reply-to sequence window; the counter wraps modulo this.
const REPLY_SEQ_MAX: u32 = 1_000_000;

static REPLY_SEQ: AtomicU32 = AtomicU32::new(0);

/// Reader-preferring cache of this host's non-loopback addresses, refreshed
/// only on explicit [`update_localhost_addrs`].
static LOCAL_ADDRS: OnceLock<RwLock<Vec<String>>> = OnceLock::new();

fn local_addrs_cache() -> &'static RwLock<Vec<String>> {
    LOCAL_ADDRS.get_or_init(|| RwLock::new(discover_local_addrs()))
}

fn discover_local_addrs() -> Vec<String> {
    match local_ip_address::list_afinet_netifas() {
        Ok(ifaces) => ifaces
            .into_iter()
            .filter_map(|(_, ip)| match ip {
                IpAddr::V4(v4) if !v4.is_loopback() => Some(v4.to_string()),
                _ => None,
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// First non-loopback address of this host, or `"127.0.0.1"` if none is
/// found.
pub fn localhost() -> String {
    let cache = local_addrs_cache().read();
    cache
        .first()
        .cloned()
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// All known non-loopback addresses of this host.
pub fn local_addrs() -> Vec<String> {
    local_addrs_cache().read().clone()
}

/// Forces a re-resolution of the local address cache. Call after a network
/// interface change; never invoked implicitly.
pub fn update_localhost_addrs() {
    let fresh = discover_local_addrs();
    *local_addrs_cache().write() = fresh;
}

/// True if `host` parses as a literal IPv4 or IPv6 address (as opposed to a
/// hostname needing resolution).
pub fn is_ipaddr(host: &str) -> bool {
    host.parse::<IpAddr>().is_ok()
}

fn hash_str(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic 8-hex-digit actor identity derived from
/// `(proxy_host, actor_name, random_suffix 0-99)`.
pub fn encode_identity(proxy_host: &str, actor_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..100);
    let combined = format!("{proxy_host}#{actor_name}#{suffix}");
    let digest = hash_str(&combined);
    format!("{:08x}", (digest & 0xFFFF_FFFF) as u32)
}

/// 9-digit control id: language prefix `2`, a 3-digit hash of the local
/// host, and 5 random digits.
pub fn control_id() -> u32 {
    let host_hash = (hash_str(&localhost()) % 1000) as u32;
    let random: u32 = rand::thread_rng().gen_range(0..100_000);
    LANG_PREFIX * 100_000_000 + host_hash * 100_000 + random
}

/// Same numbering scheme as [`control_id`]; used for any other
/// process-scoped random identifier (e.g. a registrar request id).
pub fn random_id() -> u32 {
    control_id()
}

/// Next value of the global reply-to sequence counter, wrapped into
/// `[2_000_000, 2_999_999]`. Mirrors the original's pre-increment-then-mod:
/// the counter itself wraps through the full `u32` range, and only the
/// post-increment value modulo the window width is ever exposed.
fn next_reply_seq() -> u32 {
    let prev = REPLY_SEQ.fetch_add(1, Ordering::Relaxed);
    let incremented = prev.wrapping_add(1);
    REPLY_SEQ_BASE + (incremented % REPLY_SEQ_MAX)
}

/// Overrides the reply-to counter's raw value; used by tests to exercise
/// the wrap-around boundary deterministically.
pub fn set_reply_seq_raw(value: u32) {
    REPLY_SEQ.store(value, Ordering::Relaxed);
}

/// Fresh reply-to topic string `ret:<actor_identity>:<seq>` for a sync
/// publish.
pub fn next_reply_to(actor_identity: &str) -> String {
    format!("ret:{actor_identity}:{}", next_reply_seq())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_eight_hex_digits() {
        let id = encode_identity("10.2.9.1", "asimov");
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn control_id_has_nine_digits_and_language_prefix() {
        let id = control_id();
        assert_eq!(id.to_string().len(), 9);
        assert_eq!(id / 100_000_000, 2);
    }

    #[test]
    fn reply_to_wraps_at_u32_max() {
        set_reply_seq_raw(u32::MAX);
        let a = next_reply_to("deadbeef");
        let b = next_reply_to("deadbeef");
        let c = next_reply_to("deadbeef");
        assert_eq!(a, "ret:deadbeef:2000000");
        assert_eq!(b, "ret:deadbeef:2000001");
        assert_eq!(c, "ret:deadbeef:2000002");
    }

    #[test]
    fn ip_detection() {
        assert!(is_ipaddr("10.2.9.1"));
        assert!(!is_ipaddr("localhost"));
    }
}
