// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use rmp::Marker;

/// Bytes reserved at the start of the buffer for the msgpack `array32` prefix.
pub const HEADER_SIZE: usize = 5;

/// Fixed-size region holding encoded traces back to back after a reserved header.
///
/// The buffer never grows: it is allocated once with its full capacity and reused across
/// batches. It only advances through [`Buffer::commit`].
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
    offset: usize,
    count: usize,
}

/// Immutable, owned snapshot of a finalized buffer.
///
/// The payload is a copy, so it stays valid while the live buffer is reset and refilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBatch {
    payload: Vec<u8>,
    count: usize,
}

impl Buffer {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > HEADER_SIZE);

        Self {
            data: vec![0; capacity],
            offset: HEADER_SIZE,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn spare_len(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Free space after the write cursor.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.offset..]
    }

    /// Records one trace of `written` bytes at the write cursor.
    ///
    /// Panics if `written` is zero or larger than [`Buffer::spare_len`].
    pub fn commit(&mut self, written: usize) {
        assert!(
            written > 0 && written <= self.spare_len(),
            "commit of {written} bytes with {} bytes left",
            self.spare_len()
        );

        self.offset += written;
        self.count += 1;
    }

    /// Writes the record count prefix and copies out the used part of the buffer.
    ///
    /// Returns `None` when nothing was appended since the last reset.
    pub fn finalize(&mut self) -> Option<PendingBatch> {
        if self.is_empty() {
            return None;
        }

        self.data[0] = Marker::Array32.to_u8();
        self.data[1..HEADER_SIZE].copy_from_slice(&(self.count as u32).to_be_bytes());

        Some(PendingBatch {
            payload: self.data[..self.offset].to_vec(),
            count: self.count,
        })
    }

    pub fn reset(&mut self) {
        self.offset = HEADER_SIZE;
        self.count = 0;
    }
}

impl PendingBatch {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
