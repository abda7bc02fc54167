// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::{debug, error};
use serde::Deserialize;

use crate::exporting::{AgentReply, SendResult, TransportError};
use crate::metrics::{self, Metrics};
use crate::sampling::{PrioritySampler, RateByService};

#[derive(Debug, Deserialize)]
struct AgentResponse {
    rate_by_service: RateByService,
}

/// Turns the outcome of one send into metrics, logs and sampler feedback.
pub struct ResponseHandler {
    sampler: Arc<dyn PrioritySampler>,
    metrics: Arc<dyn Metrics>,
}

impl ResponseHandler {
    pub fn new(sampler: Arc<dyn PrioritySampler>, metrics: Arc<dyn Metrics>) -> Self {
        Self { sampler, metrics }
    }

    pub fn handle(&self, result: SendResult) {
        match result {
            Ok(reply) => self.handle_reply(reply),
            Err(err) => self.handle_error(err),
        }
    }

    fn handle_reply(&self, reply: AgentReply) {
        self.metrics.increment(metrics::RESPONSES, &[]);
        self.metrics.increment(
            metrics::RESPONSES_BY_STATUS,
            &[format!("status:{}", reply.status)],
        );

        debug!("Response from the agent: {}", reply.body);

        if !(200..=299).contains(&reply.status) {
            error!("Error from the agent: HTTP {}", reply.status);
            return;
        }

        match serde_json::from_str::<AgentResponse>(&reply.body) {
            Ok(response) => self.sampler.update(response.rate_by_service),
            Err(e) => {
                error!("Unable to parse the agent response: {e}");

                self.metrics.increment(metrics::ERRORS, &[]);
                self.metrics
                    .increment(metrics::ERRORS_BY_NAME, &[format!("name:{}", category(&e))]);
            }
        }
    }

    fn handle_error(&self, err: TransportError) {
        self.metrics.increment(metrics::ERRORS, &[]);
        self.metrics.increment(
            metrics::ERRORS_BY_NAME,
            &[format!("name:{}", err.kind.as_str())],
        );

        if let Some(code) = &err.code {
            self.metrics
                .increment(metrics::ERRORS_BY_CODE, &[format!("code:{code}")]);
        }

        error!("Error sending traces to the agent: {err}");
    }
}

fn category(e: &serde_json::Error) -> &'static str {
    match e.classify() {
        serde_json::error::Category::Io => "IoError",
        serde_json::error::Category::Syntax => "SyntaxError",
        serde_json::error::Category::Data => "DataError",
        serde_json::error::Category::Eof => "EofError",
    }
}
