// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registrar data model, driver (client) and service (server) for
//! topic-based publisher/subscriber discovery.

pub mod constants;
pub mod driver;
pub mod service;

use std::cmp::Ordering;

use crate::address::ProxyAddress;
use crate::proto;
use crate::topic::Topic;

/// Which side of a pub/sub relationship a [`Registration`] advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerType {
    Publisher,
    Subscriber,
}

impl From<OwnerType> for proto::registration::OwnerType {
    fn from(o: OwnerType) -> Self {
        match o {
            OwnerType::Publisher => proto::registration::OwnerType::Publisher,
            OwnerType::Subscriber => proto::registration::OwnerType::Subscriber,
        }
    }
}

impl From<proto::registration::OwnerType> for OwnerType {
    fn from(o: proto::registration::OwnerType) -> Self {
        match o {
            proto::registration::OwnerType::Publisher => OwnerType::Publisher,
            proto::registration::OwnerType::Subscriber => OwnerType::Subscriber,
        }
    }
}

/// An advertisement of interest in a topic, stored by the registrar.
///
/// Compared and ordered by `(name, topic, host, port, owner_type,
/// description)` in that order (§3); this is both the equality relation and
/// the total order backing [`service::RegDataSet`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub description: String,
    pub host: String,
    pub port: u16,
    pub topic: Topic,
    pub owner_type: OwnerType,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        address: &ProxyAddress,
        topic: Topic,
        owner_type: OwnerType,
    ) -> Registration {
        Registration {
            name: name.into(),
            description: description.into(),
            host: address.host().to_string(),
            port: address.pub_port(),
            topic,
            owner_type,
        }
    }

    fn sort_key(&self) -> (&str, &str, &str, u16, u8, &str) {
        (
            &self.name,
            self.topic.as_str(),
            &self.host,
            self.port,
            self.owner_type as u8,
            &self.description,
        )
    }

    /// Encodes this registration to the wire form, populating both the
    /// legacy `domain/subject/type` fields and the combined `topic` field
    /// so that either generation of peer can read it (§9 open question).
    pub fn to_proto(&self) -> proto::Registration {
        proto::Registration {
            name: self.name.clone(),
            host: self.host.clone(),
            port: self.port as i32,
            domain: self.topic.domain().to_string(),
            subject: self.topic.subject().to_string(),
            r#type: self.topic.kind().to_string(),
            ownertype: proto::registration::OwnerType::from(self.owner_type) as i32,
            description: self.description.clone(),
            topic: self.topic.as_str().to_string(),
        }
    }

    /// Decodes a wire registration, preferring the combined `topic` field
    /// over the legacy three-part form when both are present.
    pub fn from_proto(reg: &proto::Registration) -> Registration {
        let topic = if !reg.topic.is_empty() {
            Topic::raw(reg.topic.clone())
        } else {
            Topic::raw(format!("{}:{}:{}", reg.domain, reg.subject, reg.r#type))
        };
        let owner_type = proto::registration::OwnerType::try_from(reg.ownertype)
            .unwrap_or(proto::registration::OwnerType::Publisher)
            .into();
        Registration {
            name: reg.name.clone(),
            description: reg.description.clone(),
            host: reg.host.clone(),
            port: reg.port as u16,
            topic,
            owner_type,
        }
    }
}

impl PartialEq for Registration {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}
impl Eq for Registration {}

impl PartialOrd for Registration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Registration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
