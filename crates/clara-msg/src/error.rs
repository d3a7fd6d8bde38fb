// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared across the messaging substrate.

use thiserror::Error;

/// Unified error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum ClaraMsgError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("timeout after {0}ms")]
    Timeout(u64),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Expected during shutdown; callers should usually log-and-ignore
    /// rather than propagate this further.
    #[error("transport terminated")]
    TransportTerminated,

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("transport error: {0}")]
    Transport(#[from] zmq::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prost::DecodeError> for ClaraMsgError {
    fn from(e: prost::DecodeError) -> Self {
        ClaraMsgError::SerializationError(e.to_string())
    }
}

impl From<prost::EncodeError> for ClaraMsgError {
    fn from(e: prost::EncodeError) -> Self {
        ClaraMsgError::SerializationError(e.to_string())
    }
}

/// `zmq::Error::EterM` marks a socket operating on a terminated context,
/// which is the expected signal path during shutdown rather than a real
/// transport failure.
impl ClaraMsgError {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, ClaraMsgError::Transport(zmq::Error::ETERM))
            || matches!(self, ClaraMsgError::TransportTerminated)
    }
}

pub type Result<T> = std::result::Result<T, ClaraMsgError>;
