// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `{topic, meta, data}` envelope plus the typed `make_message`/
//! `parse_message`/`make_response` convenience layer.

use crate::error::{ClaraMsgError, Result};
use crate::proto::{self, Meta, WireValue};
use crate::topic::Topic;

/// A message in flight: a routing key, structured metadata, and an opaque
/// payload. `meta` is never absent structurally, but its fields (including
/// `datatype`) are otherwise unconstrained by this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    topic: Topic,
    meta: Meta,
    data: Vec<u8>,
}

impl Message {
    /// Builds a message from an explicit `Meta`. No validation is applied to
    /// `meta` or `data` here: this is also the constructor used to decode
    /// arbitrary incoming wire frames (`connection::parse_message`), and a
    /// peer is free to publish a message whose `datatype` is empty or
    /// otherwise unset. `Meta` cannot itself be absent in this API, so
    /// there is nothing left to guard against at construction time.
    pub fn new(topic: Topic, meta: Meta, data: Vec<u8>) -> Message {
        Message { topic, meta, data }
    }

    /// Builds a message whose `Meta` carries only `datatype = mimetype`.
    pub fn with_mimetype(topic: Topic, mimetype: impl Into<String>, data: Vec<u8>) -> Message {
        Message {
            topic,
            meta: Meta::for_datatype(mimetype),
            data,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_parts(self) -> (Topic, Meta, Vec<u8>) {
        (self.topic, self.meta, self.data)
    }
}

/// Builds a message by serializing `value` with its [`WireValue`] mime-type.
pub fn make_message<T: WireValue>(topic: Topic, value: &T) -> Message {
    Message::with_mimetype(topic, T::MIME_TYPE, value.serialize_value())
}

/// Builds a raw string message (mime-type `text/string`, no envelope).
pub fn make_string_message(topic: Topic, value: impl Into<String>) -> Message {
    Message::with_mimetype(topic, proto::mimetype::SINGLE_STRING, value.into().into_bytes())
}

/// Parses a message's payload as `T`, per its [`WireValue`] wire encoding.
pub fn parse_message<T: WireValue>(msg: &Message) -> Result<T> {
    T::parse_value(&msg.data)
}

/// Turns a request message into its reply: the topic becomes the request's
/// `replyto`, the `replyto` field is cleared, and meta/data are reused.
/// Fails if the request carried no `replyto`.
pub fn make_response(request: Message) -> Result<Message> {
    let (_, mut meta, data) = request.into_parts();
    let reply_topic = meta
        .replyto
        .take()
        .ok_or_else(|| ClaraMsgError::InvalidArgument("message has no replyto".into()))?;
    Ok(Message {
        topic: Topic::raw(reply_topic),
        meta,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_and_parse_int_round_trip() {
        let topic = Topic::raw("test_topic");
        let msg = make_message(topic, &42i32);
        assert_eq!(msg.meta().datatype, proto::mimetype::SINGLE_SFIXED32);
        let value: i32 = parse_message(&msg).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn response_swaps_in_replyto_and_clears_it() {
        let topic = Topic::raw("test_topic");
        let mut msg = make_message(topic, &7i32);
        msg.meta_mut().replyto = Some("ret:deadbeef:2000000".to_string());
        let response = make_response(msg).unwrap();
        assert_eq!(response.topic().as_str(), "ret:deadbeef:2000000");
        assert!(response.meta().replyto.is_none());
    }

    #[test]
    fn response_without_replyto_fails() {
        let topic = Topic::raw("test_topic");
        let msg = make_message(topic, &7i32);
        assert!(make_response(msg).is_err());
    }
}
