// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use anyhow::anyhow;
use log::{debug, error};

use crate::buffer::Buffer;
use crate::config::Config;
use crate::encoding::msgpack::MessagePackEncoder;
use crate::encoding::{EncodeError, TraceEncoder};
use crate::exporting::agent::AgentTransport;
use crate::exporting::Transport;
use crate::metadata::{MetadataBuilder, ProcessInfo};
use crate::metrics::{self, Metrics, NoopMetrics};
use crate::response::ResponseHandler;
use crate::sampling::{PrioritySampler, RateByServiceSampler};
use crate::tracing::Trace;

/// A trace that overflows gets one more attempt against an emptied buffer.
const MAX_RETRIES: u32 = 1;

/// Accumulates encoded traces and ships them to the agent in batches.
///
/// `append` and `flush` are meant to be called from a single context. Sends are
/// fire-and-forget: their outcome is processed on the transport side and never surfaces
/// here, so neither method can fail.
pub struct Writer {
    buffer: Buffer,
    flush_threshold: usize,
    encoder: Box<dyn TraceEncoder>,
    transport: Arc<dyn Transport>,
    metadata: MetadataBuilder,
    handler: Arc<ResponseHandler>,
    metrics: Arc<dyn Metrics>,
}

impl Writer {
    pub fn builder() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Number of traces waiting in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.count()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes used in the buffer, prefix included.
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.offset()
    }

    /// Encodes a trace into the buffer, flushing first if it does not fit and afterwards if
    /// the buffer went past its flush threshold. Traces too large for an empty buffer are
    /// dropped.
    pub fn append(&mut self, trace: &Trace) {
        if trace.is_empty() {
            debug!("Ignoring empty trace");
            return;
        }

        for attempt in 0..=MAX_RETRIES {
            match self.encoder.encode(self.buffer.spare_mut(), trace) {
                Ok(written) if written == 0 || written > self.buffer.spare_len() => {
                    self.reject_trace(trace, written);
                    return;
                }
                Ok(written) => {
                    debug!(
                        "Added encoded trace to buffer: {written} bytes at offset {}",
                        self.buffer.offset()
                    );

                    self.buffer.commit(written);

                    if self.buffer.offset() >= self.flush_threshold {
                        self.flush();
                    }

                    return;
                }
                Err(EncodeError::Overflow) if attempt < MAX_RETRIES => self.flush(),
                Err(EncodeError::Overflow) => {}
            }
        }

        self.drop_trace(trace);
    }

    /// Ships the buffered traces, if any, and empties the buffer right away.
    pub fn flush(&mut self) {
        let batch = match self.buffer.finalize() {
            Some(batch) => batch,
            None => return,
        };

        self.buffer.reset();

        let metadata = self.metadata.build(batch.count());
        let handler = self.handler.clone();

        self.metrics.increment(metrics::REQUESTS, &[]);

        self.transport.send(
            batch,
            metadata,
            Box::new(move |result| handler.handle(result)),
        );
    }

    fn drop_trace(&self, trace: &Trace) {
        error!(
            "Dropping trace because its payload is too large. spans={} buffer_size={}",
            trace.len(),
            self.buffer.capacity()
        );

        self.metrics.increment(metrics::ERRORS, &[]);
        self.metrics
            .increment(metrics::ERRORS_BY_NAME, &["name:PayloadTooLarge".to_string()]);
    }

    fn reject_trace(&self, trace: &Trace, written: usize) {
        error!(
            "Dropping trace because the encoder reported an invalid length. spans={} written={} available={}",
            trace.len(),
            written,
            self.buffer.spare_len()
        );

        self.metrics.increment(metrics::ERRORS, &[]);
        self.metrics
            .increment(metrics::ERRORS_BY_NAME, &["name:InvalidEncoding".to_string()]);
    }
}

#[derive(Default)]
pub struct WriterBuilder {
    config: Config,
    process_info: ProcessInfo,
    encoder: Option<Box<dyn TraceEncoder>>,
    transport: Option<Arc<dyn Transport>>,
    sampler: Option<Arc<dyn PrioritySampler>>,
    metrics: Option<Arc<dyn Metrics>>,
}

impl WriterBuilder {
    pub fn set_config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    pub fn set_url(&mut self, url: &str) -> &mut Self {
        self.config.url = url.to_owned();
        self
    }

    pub fn set_process_info(&mut self, process_info: ProcessInfo) -> &mut Self {
        self.process_info = process_info;
        self
    }

    pub fn set_encoder(&mut self, encoder: Box<dyn TraceEncoder>) -> &mut Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.transport = Some(transport);
        self
    }

    pub fn set_sampler(&mut self, sampler: Arc<dyn PrioritySampler>) -> &mut Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn set_metrics(&mut self, metrics: Arc<dyn Metrics>) -> &mut Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validates the configuration and fills unset collaborators with the defaults: msgpack
    /// encoding, HTTP transport, a rate-by-service sampler and no metrics.
    pub fn build(&mut self) -> anyhow::Result<Writer> {
        self.config.validate()?;

        let destination = self.config.destination()?;
        let transport: Arc<dyn Transport> = match self.transport.take() {
            Some(transport) => transport,
            None => Arc::new(
                AgentTransport::new()
                    .map_err(|e| anyhow!("unable to start the writer runtime: {e}"))?,
            ),
        };
        let metrics: Arc<dyn Metrics> = self
            .metrics
            .take()
            .unwrap_or_else(|| Arc::new(NoopMetrics));
        let sampler: Arc<dyn PrioritySampler> = self
            .sampler
            .take()
            .unwrap_or_else(|| Arc::new(RateByServiceSampler::new()));

        Ok(Writer {
            buffer: Buffer::new(self.config.buffer_size),
            flush_threshold: self.config.flush_threshold(),
            encoder: self
                .encoder
                .take()
                .unwrap_or_else(|| Box::new(MessagePackEncoder::new())),
            transport,
            metadata: MetadataBuilder::new(&self.process_info, destination),
            handler: Arc::new(ResponseHandler::new(sampler, metrics.clone())),
            metrics,
        })
    }
}
