// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! v0.4 trace encoding: each trace is a msgpack array of span maps.

use rmp::encode;

use crate::encoding::{EncodeError, TraceEncoder};
use crate::tracing::{Meta, Metrics, Span, Trace};

const SPAN_FIELDS: u32 = 12;

// Writing into a slice only fails once the slice is exhausted.
fn overflow<E>(_: E) -> EncodeError {
    EncodeError::Overflow
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MessagePackEncoder;

impl MessagePackEncoder {
    pub fn new() -> Self {
        Self
    }

    fn encode_trace(&self, wr: &mut &mut [u8], trace: &Trace) -> Result<(), EncodeError> {
        encode::write_array_len(wr, trace.len() as u32).map_err(overflow)?;

        for span in trace {
            self.encode_span(wr, span)?;
        }

        Ok(())
    }

    fn encode_span(&self, wr: &mut &mut [u8], span: &Span) -> Result<(), EncodeError> {
        encode::write_map_len(wr, SPAN_FIELDS).map_err(overflow)?;

        self.encode_str(wr, "service", &span.service)?;
        self.encode_str(wr, "name", &span.name)?;
        self.encode_str(wr, "resource", &span.resource)?;
        self.encode_uint(wr, "trace_id", span.trace_id)?;
        self.encode_uint(wr, "span_id", span.span_id)?;
        self.encode_uint(wr, "parent_id", span.parent_id)?;
        self.encode_sint(wr, "start", span.start)?;
        self.encode_sint(wr, "duration", span.duration)?;
        self.encode_sint(wr, "error", span.error as i64)?;
        self.encode_meta(wr, &span.meta)?;
        self.encode_metrics(wr, &span.metrics)?;
        self.encode_str(wr, "type", &span.span_type)
    }

    fn encode_str(&self, wr: &mut &mut [u8], key: &str, value: &str) -> Result<(), EncodeError> {
        encode::write_str(wr, key).map_err(overflow)?;
        encode::write_str(wr, value).map_err(overflow)
    }

    fn encode_uint(&self, wr: &mut &mut [u8], key: &str, value: u64) -> Result<(), EncodeError> {
        encode::write_str(wr, key).map_err(overflow)?;
        encode::write_uint(wr, value).map_err(overflow)?;
        Ok(())
    }

    fn encode_sint(&self, wr: &mut &mut [u8], key: &str, value: i64) -> Result<(), EncodeError> {
        encode::write_str(wr, key).map_err(overflow)?;
        encode::write_sint(wr, value).map_err(overflow)?;
        Ok(())
    }

    fn encode_meta(&self, wr: &mut &mut [u8], meta: &Meta) -> Result<(), EncodeError> {
        encode::write_str(wr, "meta").map_err(overflow)?;
        encode::write_map_len(wr, meta.len() as u32).map_err(overflow)?;

        for (k, v) in meta {
            encode::write_str(wr, k).map_err(overflow)?;
            encode::write_str(wr, v).map_err(overflow)?;
        }

        Ok(())
    }

    fn encode_metrics(&self, wr: &mut &mut [u8], metrics: &Metrics) -> Result<(), EncodeError> {
        encode::write_str(wr, "metrics").map_err(overflow)?;
        encode::write_map_len(wr, metrics.len() as u32).map_err(overflow)?;

        for (k, v) in metrics {
            encode::write_str(wr, k).map_err(overflow)?;
            encode::write_f64(wr, *v).map_err(overflow)?;
        }

        Ok(())
    }
}

impl TraceEncoder for MessagePackEncoder {
    fn encode(&mut self, dst: &mut [u8], trace: &Trace) -> Result<usize, EncodeError> {
        let available = dst.len();
        let mut wr: &mut [u8] = dst;

        self.encode_trace(&mut wr, trace)?;

        Ok(available - wr.len())
    }
}
