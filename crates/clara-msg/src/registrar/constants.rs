// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registrar wire action names.
//!
//! Two naming schemes appear across clara-msg peers: the original's
//! per-verb-per-owner-type names (`registerPublisher`, ...) and a later
//! unified scheme (`reg_add`, ...) that carries owner type in the payload
//! instead of the action name. Per §9's open question, this implementation
//! accepts both on receipt and always sends the unified form, which every
//! action can express without ambiguity; a service built against only the
//! legacy names is accommodated by [`normalize`].

pub const REG_ADD: &str = "reg_add";
pub const REG_REMOVE: &str = "reg_remove";
pub const REG_REMOVE_ALL: &str = "removeAllRegistration";
pub const REG_FIND_MATCHING: &str = "reg_find_matching";

pub const REGISTER_PUBLISHER: &str = "registerPublisher";
pub const REGISTER_SUBSCRIBER: &str = "registerSubscriber";
pub const REMOVE_PUBLISHER_REGISTRATION: &str = "removePublisherRegistration";
pub const REMOVE_SUBSCRIBER_REGISTRATION: &str = "removeSubscriberRegistration";
pub const FIND_PUBLISHER: &str = "findPublisher";
pub const FIND_SUBSCRIBER: &str = "findSubscriber";

pub const SUCCESS: &str = "success";

/// The registrar's default request timeout, in milliseconds (§4.5).
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Maps any of the legacy per-owner-type action names to the unified
/// `(action, is_publisher)` pair the service dispatches on; unified names
/// pass straight through with `is_publisher = None` (owner type must then
/// come from the registration payload).
pub fn normalize(action: &str) -> (&'static str, Option<bool>) {
    match action {
        REGISTER_PUBLISHER => (REG_ADD, Some(true)),
        REGISTER_SUBSCRIBER => (REG_ADD, Some(false)),
        REMOVE_PUBLISHER_REGISTRATION => (REG_REMOVE, Some(true)),
        REMOVE_SUBSCRIBER_REGISTRATION => (REG_REMOVE, Some(false)),
        FIND_PUBLISHER => (REG_FIND_MATCHING, Some(true)),
        FIND_SUBSCRIBER => (REG_FIND_MATCHING, Some(false)),
        REG_ADD => (REG_ADD, None),
        REG_REMOVE_ALL => (REG_REMOVE_ALL, None),
        REG_FIND_MATCHING => (REG_FIND_MATCHING, None),
        REG_REMOVE => (REG_REMOVE, None),
        _ => (UNKNOWN, None),
    }
}

/// Sentinel returned by [`normalize`] for an action name matching none of
/// the legacy or unified schemes, so the registrar service's dispatch falls
/// through to its `unknown action` error response instead of silently
/// treating it as `reg_add`.
pub const UNKNOWN: &str = "__unknown__";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_names_normalize_with_owner_type() {
        assert_eq!(normalize(REGISTER_PUBLISHER), (REG_ADD, Some(true)));
        assert_eq!(normalize(FIND_SUBSCRIBER), (REG_FIND_MATCHING, Some(false)));
    }

    #[test]
    fn unified_names_pass_through() {
        assert_eq!(normalize(REG_ADD), (REG_ADD, None));
    }
}
