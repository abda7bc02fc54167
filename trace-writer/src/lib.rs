// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Buffered trace writer for the Datadog Trace Agent.
//!
//! Traces are encoded into a fixed-size buffer as they are appended. The buffer is shipped
//! to the agent as a single msgpack array when it fills past a threshold or when the caller
//! flushes it, and the `rate_by_service` returned by the agent is fed back to the sampler.

pub mod buffer;
pub mod config;
pub mod encoding;
pub mod exporting;
pub mod metadata;
pub mod metrics;
pub mod response;
pub mod runtime;
pub mod sampling;
pub mod tracing;
pub mod writer;

pub use config::{Config, Destination};
pub use metadata::ProcessInfo;
pub use writer::{Writer, WriterBuilder};
