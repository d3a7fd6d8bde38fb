// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hierarchical `domain[:subject[:type]]` routing key with a byte-prefix
//! parent relation.

use crate::error::{ClaraMsgError, Result};

/// Sentinel meaning "unspecified" for `subject`/`type`. Must never appear as
/// `domain`.
pub const ANY: &str = "*";

/// A validated or raw-wrapped topic string.
///
/// Equality and hashing are on the stored string, which is also what a
/// broker's XPUB filter compares against, so `Topic` never normalizes beyond
/// what `build` already does at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(String);

impl Topic {
    /// Builds a topic from a domain alone. Fails if `domain == "*"`.
    pub fn build(domain: &str) -> Result<Topic> {
        Topic::build3(domain, ANY, ANY)
    }

    /// Builds a topic from domain and subject. Fails per the rules of
    /// [`Topic::build3`].
    pub fn build2(domain: &str, subject: &str) -> Result<Topic> {
        Topic::build3(domain, subject, ANY)
    }

    /// Builds a topic from all three parts.
    ///
    /// `domain` must not be `"*"`. If `subject == "*"`, `type` must also be
    /// `"*"`. A multi-part `type` (itself containing `:`) has any trailing
    /// `*` segments truncated, e.g. `"metallica:lars:*"` collapses to
    /// `"metallica:lars"`.
    pub fn build3(domain: &str, subject: &str, kind: &str) -> Result<Topic> {
        if domain == ANY {
            return Err(ClaraMsgError::InvalidArgument(
                "domain is not defined".into(),
            ));
        }
        if subject == ANY && kind != ANY {
            return Err(ClaraMsgError::InvalidArgument(
                "subject is not defined".into(),
            ));
        }

        let mut parts = vec![domain.to_string()];
        if subject != ANY {
            parts.push(subject.to_string());
        }
        if subject != ANY && kind != ANY {
            for seg in kind.split(':') {
                if seg == ANY {
                    break;
                }
                parts.push(seg.to_string());
            }
        }
        Ok(Topic(parts.join(":")))
    }

    /// Wraps an already-valid topic string with no validation. Used on the
    /// hot path to wrap topic bytes straight off the wire.
    pub fn raw(s: impl Into<String>) -> Topic {
        Topic(s.into())
    }

    /// The full stored string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn domain(&self) -> &str {
        match self.0.find(':') {
            Some(i) => &self.0[..i],
            None => &self.0,
        }
    }

    pub fn subject(&self) -> &str {
        let mut parts = self.0.splitn(3, ':');
        parts.next();
        parts.next().unwrap_or(ANY)
    }

    pub fn kind(&self) -> &str {
        match self.0.match_indices(':').nth(1) {
            Some((i, _)) => &self.0[i + 1..],
            None => ANY,
        }
    }

    /// `self.is_parent(other)` iff `other` begins with `self` as a literal
    /// byte prefix (not a `:`-segment prefix — `"rock:me"` is a byte-prefix
    /// of `"rock:metal"` too, matching the original's raw `string::compare`
    /// semantics).
    pub fn is_parent(&self, other: &Topic) -> bool {
        other.0.as_bytes().starts_with(self.0.as_bytes())
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_domain() {
        assert!(Topic::build(ANY).is_err());
    }

    #[test]
    fn build_rejects_any_subject_with_concrete_type() {
        assert!(Topic::build3("rock", ANY, "metal").is_err());
    }

    #[test]
    fn build_collapses_trailing_wildcard_type() {
        let t = Topic::build3("rock", "metal", "metallica:lars:*").unwrap();
        assert_eq!(t.as_str(), "rock:metal:metallica:lars");
    }

    #[test]
    fn build_two_part() {
        let t = Topic::build2("rock", "metal").unwrap();
        assert_eq!(t.as_str(), "rock:metal");
        assert_eq!(t.domain(), "rock");
        assert_eq!(t.subject(), "metal");
        assert_eq!(t.kind(), ANY);
    }

    #[test]
    fn parts_of_raw_topic() {
        let t = Topic::raw("rock:metal:metallica");
        assert_eq!(t.domain(), "rock");
        assert_eq!(t.subject(), "metal");
        assert_eq!(t.kind(), "metallica");

        let t = Topic::raw("rock");
        assert_eq!(t.domain(), "rock");
        assert_eq!(t.subject(), ANY);
        assert_eq!(t.kind(), ANY);
    }

    #[test]
    fn is_parent_reflexive_and_transitive() {
        let a = Topic::raw("rock");
        let b = Topic::raw("rock:metal");
        let c = Topic::raw("rock:metal:metallica");
        assert!(a.is_parent(&a));
        assert!(a.is_parent(&b));
        assert!(b.is_parent(&c));
        assert!(a.is_parent(&c));
    }

    #[test]
    fn is_parent_examples_from_spec() {
        let rock_metal = Topic::raw("rock:metal");
        let metallica = Topic::raw("rock:metal:metallica");
        let rock = Topic::raw("rock");
        assert!(rock_metal.is_parent(&metallica));
        assert!(!rock_metal.is_parent(&rock));
    }
}
