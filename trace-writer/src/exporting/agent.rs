// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::error::Error as StdError;
use std::io;

use hyper::client::HttpConnector;
use hyper::{body, Body, Client, Method, Request, Response, Uri};
use hyperlocal::UnixConnector;
use log::debug;
use tokio::runtime::Handle;

use crate::buffer::PendingBatch;
use crate::config::Destination;
use crate::exporting::{
    AgentReply, Completion, SendResult, Transport, TransportError, TransportErrorKind,
};
use crate::metadata::RequestMetadata;
use crate::runtime;

/// Sends batches over HTTP/1.1 to the agent, on TCP or on a Unix domain socket.
///
/// Requests run on a background runtime; `send` only builds the request and spawns it.
pub struct AgentTransport {
    tcp: Client<HttpConnector>,
    unix: Client<UnixConnector>,
    runtime: Handle,
}

impl AgentTransport {
    /// Uses the process-wide writer runtime.
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_runtime(runtime::handle()?))
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            tcp: Client::builder().build(HttpConnector::new()),
            unix: Client::builder().build(UnixConnector),
            runtime,
        }
    }

    async fn request(
        tcp: Client<HttpConnector>,
        unix: Client<UnixConnector>,
        unix_socket: bool,
        req: Request<Body>,
    ) -> SendResult {
        let res = if unix_socket {
            unix.request(req).await
        } else {
            tcp.request(req).await
        };

        let res: Response<Body> = res.map_err(|e| classify(&e))?;
        let status = res.status().as_u16();
        let bytes = body::to_bytes(res.into_body()).await.map_err(|e| {
            let mut err = classify(&e);
            err.kind = TransportErrorKind::Body;
            err
        })?;

        Ok(AgentReply {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

impl Transport for AgentTransport {
    fn send(&self, batch: PendingBatch, metadata: RequestMetadata, done: Completion) {
        let unix_socket = matches!(metadata.destination, Destination::Unix { .. });
        let req = match build_request(batch.into_payload(), &metadata) {
            Ok(req) => req,
            Err(e) => {
                done(Err(TransportError::new(
                    TransportErrorKind::Other,
                    e.to_string(),
                )));
                return;
            }
        };

        debug!(
            "Request to the agent: {} {} {:?}",
            req.method(),
            req.uri(),
            metadata.headers
        );

        let tcp = self.tcp.clone();
        let unix = self.unix.clone();

        self.runtime.spawn(async move {
            done(Self::request(tcp, unix, unix_socket, req).await);
        });
    }
}

fn build_request(
    payload: Vec<u8>,
    metadata: &RequestMetadata,
) -> Result<Request<Body>, hyper::http::Error> {
    let uri: Uri = match &metadata.destination {
        Destination::Unix { socket_path } => {
            hyperlocal::Uri::new(socket_path, metadata.path).into()
        }
        Destination::Tcp { host, port } => {
            format!("http://{host}:{port}{}", metadata.path).parse()?
        }
    };

    let mut builder = Request::builder().method(Method::PUT).uri(uri);
    for (key, value) in &metadata.headers {
        builder = builder.header(*key, value.as_str());
    }

    builder.body(Body::from(payload))
}

fn classify(e: &hyper::Error) -> TransportError {
    let kind = if e.is_connect() {
        TransportErrorKind::Connect
    } else if e.is_timeout() {
        TransportErrorKind::TimedOut
    } else if e.is_canceled() {
        TransportErrorKind::Canceled
    } else if e.is_closed() || e.is_incomplete_message() {
        TransportErrorKind::Io
    } else {
        TransportErrorKind::Other
    };

    let err = TransportError::new(kind, e.to_string());

    match io_error_kind(e) {
        Some(code) => err.with_code(format!("{code:?}")),
        None => err,
    }
}

fn io_error_kind(e: &hyper::Error) -> Option<io::ErrorKind> {
    let mut source = e.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = err.source();
    }
    None
}
