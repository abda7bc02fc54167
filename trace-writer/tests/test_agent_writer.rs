// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod agent_writer_tests {
    use datadog_trace_writer::metrics::{self, Metrics};
    use datadog_trace_writer::sampling::RateByServiceSampler;
    use datadog_trace_writer::tracing::{Span, Trace};
    use datadog_trace_writer::{ProcessInfo, Writer};
    use httpmock::prelude::*;
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct TestMetrics {
        names: Mutex<Vec<String>>,
    }

    impl TestMetrics {
        fn count(&self, name: &str) -> usize {
            self.names
                .lock()
                .unwrap()
                .iter()
                .filter(|n| *n == name)
                .count()
        }
    }

    impl Metrics for TestMetrics {
        fn increment(&self, name: &str, _tags: &[String]) {
            self.names.lock().unwrap().push(name.to_string());
        }
    }

    fn process_info() -> ProcessInfo {
        ProcessInfo {
            tracer_version: "0.1.0".to_string(),
            language: "rust".to_string(),
            language_version: Some("1.76.0".to_string()),
            language_interpreter: None,
        }
    }

    fn trace(trace_id: u64) -> Trace {
        vec![
            Span {
                trace_id,
                span_id: 1,
                name: "web.request".to_string(),
                resource: "GET /".to_string(),
                service: "api".to_string(),
                span_type: "web".to_string(),
                start: 1_000,
                duration: 500,
                ..Default::default()
            },
            Span {
                trace_id,
                span_id: 2,
                parent_id: 1,
                name: "db.query".to_string(),
                resource: "SELECT 1".to_string(),
                service: "api-db".to_string(),
                span_type: "sql".to_string(),
                start: 1_100,
                duration: 200,
                ..Default::default()
            },
        ]
    }

    async fn wait_for(condition: impl Fn() -> bool) -> bool {
        for _ in 0..500 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn sends_batch_and_applies_sampling_rates() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v0.4/traces")
                    .header("content-type", "application/msgpack")
                    .header("x-datadog-trace-count", "2")
                    .header("datadog-meta-lang", "rust")
                    .header("datadog-meta-lang-version", "1.76.0")
                    .header("datadog-meta-tracer-version", "0.1.0")
                    .header_missing("datadog-meta-lang-interpreter");
                then.status(200)
                    .body(r#"{"rate_by_service":{"service:api,env:prod":0.5}}"#);
            })
            .await;

        let sampler = Arc::new(RateByServiceSampler::new());
        let metrics = Arc::new(TestMetrics::default());
        let mut writer = Writer::builder()
            .set_url(&server.base_url())
            .set_process_info(process_info())
            .set_sampler(sampler.clone())
            .set_metrics(metrics.clone())
            .build()
            .unwrap();

        writer.append(&trace(1));
        writer.append(&trace(2));
        writer.flush();

        assert!(writer.is_empty());
        assert!(wait_for(|| sampler.rate("api", "prod") == 0.5).await);

        mock.assert_async().await;
        assert_eq!(metrics.count(metrics::REQUESTS), 1);
        assert_eq!(metrics.count(metrics::RESPONSES), 1);
        assert_eq!(metrics.count(metrics::ERRORS), 0);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn malformed_response_is_counted() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/v0.4/traces");
                then.status(200).body("OK");
            })
            .await;

        let sampler = Arc::new(RateByServiceSampler::new());
        let metrics = Arc::new(TestMetrics::default());
        let mut writer = Writer::builder()
            .set_url(&server.base_url())
            .set_process_info(process_info())
            .set_sampler(sampler.clone())
            .set_metrics(metrics.clone())
            .build()
            .unwrap();

        writer.append(&trace(1));
        writer.flush();

        assert!(wait_for(|| metrics.count(metrics::ERRORS) == 1).await);
        mock.assert_async().await;
        assert_eq!(metrics.count(metrics::RESPONSES), 1);
        assert_eq!(sampler.rate("api", "prod"), 1.0);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn error_status_leaves_sampler_untouched() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/v0.4/traces");
                then.status(503)
                    .body(r#"{"rate_by_service":{"service:,env:":0.0}}"#);
            })
            .await;

        let sampler = Arc::new(RateByServiceSampler::new());
        let metrics = Arc::new(TestMetrics::default());
        let mut writer = Writer::builder()
            .set_url(&server.base_url())
            .set_process_info(process_info())
            .set_sampler(sampler.clone())
            .set_metrics(metrics.clone())
            .build()
            .unwrap();

        writer.append(&trace(1));
        writer.flush();

        assert!(wait_for(|| metrics.count(metrics::RESPONSES_BY_STATUS) == 1).await);
        mock.assert_async().await;
        assert_eq!(metrics.count(metrics::ERRORS), 0);
        assert_eq!(sampler.rate("api", "prod"), 1.0);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn unreachable_agent_is_counted_without_retry() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let metrics = Arc::new(TestMetrics::default());
        let mut writer = Writer::builder()
            .set_url(&format!("http://127.0.0.1:{port}"))
            .set_process_info(process_info())
            .set_metrics(metrics.clone())
            .build()
            .unwrap();

        writer.append(&trace(1));
        writer.flush();

        assert!(wait_for(|| metrics.count(metrics::ERRORS_BY_NAME) == 1).await);
        assert_eq!(metrics.count(metrics::ERRORS), 1);
        assert_eq!(metrics.count(metrics::REQUESTS), 1);
        assert_eq!(metrics.count(metrics::RESPONSES), 0);

        writer.append(&trace(2));
        assert_eq!(writer.len(), 1);
    }
}
