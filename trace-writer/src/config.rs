// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use hyper::Uri;
use serde::{Deserialize, Serialize};

use crate::buffer::HEADER_SIZE;

pub const DEFAULT_URL: &str = "http://localhost:8126";
pub const DEFAULT_PORT: u16 = 8126;
pub const DEFAULT_BUFFER_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_FLUSH_RATIO: f64 = 0.8;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Agent address, either `http://host[:port]` or `unix://<socket path>`.
    pub url: String,
    /// Size in bytes of the encoding buffer, header included.
    pub buffer_size: usize,
    /// Fill level, as a fraction of `buffer_size`, that triggers an automatic flush.
    pub flush_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_ratio: DEFAULT_FLUSH_RATIO,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.flush_ratio > 0.0 && self.flush_ratio < 1.0) {
            bail!("flush ratio must be within (0, 1), got {}", self.flush_ratio);
        }

        let threshold = self.flush_threshold();
        if threshold <= HEADER_SIZE || threshold >= self.buffer_size {
            bail!(
                "flush threshold of {threshold} bytes must be above {HEADER_SIZE} and below the buffer size of {}",
                self.buffer_size
            );
        }

        self.destination().map(|_| ())
    }

    /// Offset at or past which the buffer is flushed after an append.
    pub fn flush_threshold(&self) -> usize {
        (self.buffer_size as f64 * self.flush_ratio) as usize
    }

    pub fn destination(&self) -> anyhow::Result<Destination> {
        Destination::from_url(&self.url)
    }
}

/// Where batches are sent, selected by the scheme of the configured URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Unix { socket_path: PathBuf },
    Tcp { host: String, port: u16 },
}

impl Destination {
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        // `unix:///path` has an empty authority, which `Uri` refuses.
        if let Some(path) = url
            .strip_prefix("unix://")
            .or_else(|| url.strip_prefix("unix:"))
        {
            if path.is_empty() {
                bail!("missing socket path in {url}");
            }

            return Ok(Destination::Unix {
                socket_path: PathBuf::from(path),
            });
        }

        let uri: Uri = url
            .parse()
            .map_err(|e| anyhow!("invalid agent url {url}: {e}"))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(scheme) => bail!("unsupported scheme {scheme} in {url}"),
            None => bail!("missing scheme in {url}"),
        }

        let host = uri
            .host()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| anyhow!("missing host in {url}"))?;

        Ok(Destination::Tcp {
            host: host.to_string(),
            port: uri.port_u16().unwrap_or(DEFAULT_PORT),
        })
    }
}
