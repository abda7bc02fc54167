// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::config::Destination;

pub const TRACES_PATH: &str = "/v0.4/traces";
pub const CONTENT_TYPE: &str = "application/msgpack";

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_TRACER_VERSION: &str = "Datadog-Meta-Tracer-Version";
pub const HEADER_LANG: &str = "Datadog-Meta-Lang";
pub const HEADER_LANG_VERSION: &str = "Datadog-Meta-Lang-Version";
pub const HEADER_LANG_INTERPRETER: &str = "Datadog-Meta-Lang-Interpreter";
pub const HEADER_TRACE_COUNT: &str = "X-Datadog-Trace-Count";

/// Identity of the tracer and of the runtime it instruments. Fixed for the process lifetime.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ProcessInfo {
    pub tracer_version: String,
    pub language: String,
    pub language_version: Option<String>,
    pub language_interpreter: Option<String>,
}

/// Everything the transport needs to address one batch.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestMetadata {
    pub destination: Destination,
    pub path: &'static str,
    pub headers: Vec<(&'static str, String)>,
}

impl RequestMetadata {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Computes the static part of the request metadata once and stamps the trace count per batch.
#[derive(Clone, Debug)]
pub struct MetadataBuilder {
    destination: Destination,
    static_headers: Vec<(&'static str, String)>,
}

impl MetadataBuilder {
    pub fn new(info: &ProcessInfo, destination: Destination) -> Self {
        let mut static_headers = vec![(HEADER_CONTENT_TYPE, CONTENT_TYPE.to_string())];

        Self::set_header(&mut static_headers, HEADER_TRACER_VERSION, Some(&info.tracer_version));
        Self::set_header(&mut static_headers, HEADER_LANG, Some(&info.language));
        Self::set_header(
            &mut static_headers,
            HEADER_LANG_VERSION,
            info.language_version.as_ref(),
        );
        Self::set_header(
            &mut static_headers,
            HEADER_LANG_INTERPRETER,
            info.language_interpreter.as_ref(),
        );

        Self {
            destination,
            static_headers,
        }
    }

    pub fn build(&self, count: usize) -> RequestMetadata {
        let mut headers = self.static_headers.clone();
        headers.push((HEADER_TRACE_COUNT, count.to_string()));

        RequestMetadata {
            destination: self.destination.clone(),
            path: TRACES_PATH,
            headers,
        }
    }

    fn set_header(
        headers: &mut Vec<(&'static str, String)>,
        key: &'static str,
        value: Option<&String>,
    ) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            headers.push((key, value.clone()));
        }
    }
}
