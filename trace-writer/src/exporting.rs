// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

use crate::buffer::PendingBatch;
use crate::metadata::RequestMetadata;

pub mod agent;

/// Response of the agent to one batch, whatever its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentReply {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    TimedOut,
    Canceled,
    Body,
    Io,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Connect => "ConnectError",
            TransportErrorKind::TimedOut => "TimeoutError",
            TransportErrorKind::Canceled => "CanceledError",
            TransportErrorKind::Body => "BodyError",
            TransportErrorKind::Io => "IoError",
            TransportErrorKind::Other => "Error",
        }
    }
}

/// A batch that never got a response from the agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    /// Transport specific error code, e.g. the I/O error kind of a refused connection.
    pub code: Option<String>,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code}): {}", self.kind.as_str(), self.message),
            None => write!(f, "{}: {}", self.kind.as_str(), self.message),
        }
    }
}

impl std::error::Error for TransportError {}

pub type SendResult = Result<AgentReply, TransportError>;

/// Called exactly once with the outcome of a send, possibly on another thread.
pub type Completion = Box<dyn FnOnce(SendResult) + Send + 'static>;

/// Ships finalized batches to the agent.
///
/// `send` must return without waiting for the request: the outcome is reported later
/// through `done`. The batch is owned by the transport from then on.
pub trait Transport: Send + Sync {
    fn send(&self, batch: PendingBatch, metadata: RequestMetadata, done: Completion);
}
