// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

use crate::tracing::Trace;

pub mod msgpack;

/// Reasons an encoder can refuse a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The encoded trace does not fit in the remaining space.
    Overflow,
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Overflow => write!(f, "encoded trace exceeds the remaining buffer space"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Encodes one trace into a byte region.
///
/// `dst` is the free part of the buffer. On success the encoder returns how many bytes it
/// wrote at the start of `dst`. On failure it may have scribbled into `dst`, but the caller
/// only ever commits the length returned by a successful call, so nothing of a failed
/// attempt becomes part of a batch.
pub trait TraceEncoder: Send {
    fn encode(&mut self, dst: &mut [u8], trace: &Trace) -> Result<usize, EncodeError>;
}
