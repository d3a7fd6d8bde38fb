// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory registrar: the ordered set of [`Registration`]s and the REP
//! socket loop that serves it (§4.5).

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use prost::Message as _;

use super::constants;
use super::{OwnerType, Registration};
use crate::address::RegAddress;
use crate::error::Result;
use crate::proto;

/// Ordered set of [`Registration`]s keyed by the §3 comparator; duplicates
/// by that key collapse silently, matching a `BTreeSet`'s own semantics.
#[derive(Debug, Default)]
pub struct RegDataSet {
    entries: BTreeSet<Registration>,
}

impl RegDataSet {
    pub fn new() -> RegDataSet {
        RegDataSet::default()
    }

    pub fn add(&mut self, reg: Registration) {
        self.entries.insert(reg);
    }

    pub fn remove(&mut self, reg: &Registration) {
        self.entries.remove(reg);
    }

    /// Removes every registration with matching `host` and `owner_type`,
    /// regardless of name/topic/description (§4.5's `removeAllRegistration`).
    pub fn remove_all(&mut self, host: &str, owner_type: OwnerType) {
        self.entries
            .retain(|r| !(r.host == host && r.owner_type == owner_type));
    }

    /// Matches a find query per §4.5's asymmetric rule: a publisher query
    /// returns stored publishers whose topic the query is a parent of (the
    /// query is less specific or equal); a subscriber query returns stored
    /// subscribers whose topic is a parent of the query (the subscriber's
    /// interest covers the query).
    pub fn find(&self, owner_type: OwnerType, query_topic: &crate::topic::Topic) -> Vec<&Registration> {
        self.entries
            .iter()
            .filter(|r| r.owner_type == owner_type)
            .filter(|r| match owner_type {
                OwnerType::Publisher => query_topic.is_parent(&r.topic),
                OwnerType::Subscriber => r.topic.is_parent(query_topic),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs the registrar's REP loop until `alive` is cleared or the socket's
/// context is terminated. All mutation and lookup goes through `store`,
/// which is the serialization point for any future multi-worker service,
/// even though the REP socket already processes one request at a time.
pub fn run(
    ctx: &zmq::Context,
    addr: &RegAddress,
    store: Arc<Mutex<RegDataSet>>,
    alive: Arc<std::sync::atomic::AtomicBool>,
) -> Result<()> {
    let socket = ctx.socket(zmq::REP)?;
    socket.set_rcvhwm(0)?;
    socket.set_sndhwm(0)?;
    socket.bind(&format!("tcp://{}:{}", addr.host(), addr.port()))?;

    while alive.load(std::sync::atomic::Ordering::Relaxed) {
        match socket.poll(zmq::POLLIN, 100) {
            Ok(n) if n > 0 => {}
            Ok(_) => continue,
            Err(zmq::Error::ETERM) => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let frames = match socket.recv_multipart(0) {
            Ok(f) => f,
            Err(zmq::Error::ETERM) => return Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "registrar recv failed");
                continue;
            }
        };

        let response = handle_request(&frames, &store);
        if let Err(e) = socket.send_multipart(response, 0) {
            tracing::warn!(error = %e, "registrar reply failed");
        }
    }
    Ok(())
}

fn handle_request(frames: &[Vec<u8>], store: &Arc<Mutex<RegDataSet>>) -> Vec<Vec<u8>> {
    let (action, sender, reg_bytes) = match frames {
        [a, s, r] => (
            String::from_utf8_lossy(a).to_string(),
            String::from_utf8_lossy(s).to_string(),
            r,
        ),
        _ => {
            return error_response(
                "unknown",
                "unknown",
                &format!("expected 3 request frames, got {}", frames.len()),
            )
        }
    };

    let reg = match proto::Registration::decode(reg_bytes.as_slice()) {
        Ok(r) => Registration::from_proto(&r),
        Err(e) => return error_response(&action, &sender, &format!("bad registration: {e}")),
    };

    let (normalized, owner_hint) = constants::normalize(&action);
    let owner_type = owner_hint.map(|is_pub| {
        if is_pub {
            OwnerType::Publisher
        } else {
            OwnerType::Subscriber
        }
    });

    match normalized {
        constants::REG_ADD => {
            store.lock().add(reg);
            success_response(&action, &sender, &[])
        }
        constants::REG_REMOVE => {
            store.lock().remove(&reg);
            success_response(&action, &sender, &[])
        }
        constants::REG_REMOVE_ALL => {
            let owner_type = owner_type.unwrap_or(reg.owner_type);
            store.lock().remove_all(&reg.host, owner_type);
            success_response(&action, &sender, &[])
        }
        constants::REG_FIND_MATCHING => {
            let owner_type = owner_type.unwrap_or(reg.owner_type);
            let guard = store.lock();
            let matches: Vec<proto::Registration> = guard
                .find(owner_type, &reg.topic)
                .into_iter()
                .map(Registration::to_proto)
                .collect();
            success_response(&action, &sender, &matches)
        }
        other => error_response(&action, &sender, &format!("unknown action: {other}")),
    }
}

fn success_response(action: &str, sender: &str, regs: &[proto::Registration]) -> Vec<Vec<u8>> {
    let mut frames = vec![
        action.as_bytes().to_vec(),
        sender.as_bytes().to_vec(),
        constants::SUCCESS.as_bytes().to_vec(),
    ];
    for r in regs {
        frames.push(r.encode_to_vec());
    }
    frames
}

fn error_response(action: &str, sender: &str, message: &str) -> Vec<Vec<u8>> {
    vec![
        action.as_bytes().to_vec(),
        sender.as_bytes().to_vec(),
        message.as_bytes().to_vec(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ProxyAddress;
    use crate::topic::Topic;

    fn reg(name: &str, topic: &str, owner: OwnerType) -> Registration {
        let addr = ProxyAddress::new("10.2.9.1").unwrap();
        Registration::new(name, "", &addr, Topic::raw(topic), owner)
    }

    #[test]
    fn find_symmetry_from_spec_scenario() {
        let mut set = RegDataSet::new();
        set.add(reg("asimov", "writer:scifi:books", OwnerType::Publisher));
        set.add(reg("bradbury", "writer:scifi", OwnerType::Subscriber));

        let pubs = set.find(OwnerType::Publisher, &Topic::raw("writer:scifi"));
        assert_eq!(pubs.len(), 1);
        assert_eq!(pubs[0].name, "asimov");

        let subs = set.find(OwnerType::Subscriber, &Topic::raw("writer:scifi:books"));
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "bradbury");
    }

    #[test]
    fn duplicate_registration_collapses() {
        let mut set = RegDataSet::new();
        set.add(reg("asimov", "writer:scifi", OwnerType::Publisher));
        set.add(reg("asimov", "writer:scifi", OwnerType::Publisher));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_all_filters_by_host_and_owner_type() {
        let mut set = RegDataSet::new();
        set.add(reg("asimov", "writer:scifi", OwnerType::Publisher));
        set.add(reg("bradbury", "writer:scifi", OwnerType::Subscriber));
        set.remove_all("10.2.9.1", OwnerType::Publisher);
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.find(OwnerType::Subscriber, &Topic::raw("writer:scifi")).len(),
            1
        );
    }
}
