// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

pub type Meta = HashMap<String, String>;
pub type Metrics = HashMap<String, f64>;

/// A trace is the ordered list of spans of one operation tree, submitted whole.
pub type Trace = Vec<Span>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Span {
    pub trace_id: u64,
    pub span_id: u64,
    pub parent_id: u64,
    pub name: String,
    pub resource: String,
    pub service: String,
    pub span_type: String,
    pub error: i32,
    pub start: i64,
    pub duration: i64,
    pub meta: Meta,
    pub metrics: Metrics,
}
