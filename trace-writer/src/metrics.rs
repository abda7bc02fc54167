// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Health counters emitted by the writer.
//!
//! All names share the `datadog.tracer.rust.exporter.agent` prefix. Tagged variants
//! (`*.by.status`, `*.by.name`, `*.by.code`) carry a single `key:value` tag.

pub const REQUESTS: &str = "datadog.tracer.rust.exporter.agent.requests";
pub const RESPONSES: &str = "datadog.tracer.rust.exporter.agent.responses";
pub const RESPONSES_BY_STATUS: &str = "datadog.tracer.rust.exporter.agent.responses.by.status";
pub const ERRORS: &str = "datadog.tracer.rust.exporter.agent.errors";
pub const ERRORS_BY_NAME: &str = "datadog.tracer.rust.exporter.agent.errors.by.name";
pub const ERRORS_BY_CODE: &str = "datadog.tracer.rust.exporter.agent.errors.by.code";

/// Counter sink. Implementations must not block and must swallow their own failures.
pub trait Metrics: Send + Sync {
    fn increment(&self, name: &str, tags: &[String]);
}

/// Discards every counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn increment(&self, _name: &str, _tags: &[String]) {}
}
