// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;

use once_cell::sync::Lazy;
use tokio::runtime::{Builder, Handle, Runtime};

/// Runtime shared by every agent transport of the process. Started on first use.
static RUNTIME: Lazy<io::Result<Runtime>> = Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("dd-trace-writer")
        .enable_all()
        .build()
});

pub fn handle() -> io::Result<Handle> {
    match &*RUNTIME {
        Ok(runtime) => Ok(runtime.handle().clone()),
        Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
    }
}
