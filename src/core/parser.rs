//! # Binary Reader
//!
//! Accepts and buffers binary data and provides an interface for reading
//! fixed-width integers and byte runs from it.
//!
//! Chunks pushed into the reader are kept intact; a read that falls entirely
//! within one chunk is returned as a zero-copy slice, and only reads that
//! span chunk boundaries copy into a fresh buffer. All integer reads are
//! little-endian. Reading past the buffered bytes fails fast with
//! [`ProtocolError::InsufficientData`] — reads are synchronous and never
//! block waiting for more input.

use crate::error::{ProtocolError, Result};
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;

/// Buffering binary reader over a queue of appended chunks.
#[derive(Debug, Default)]
pub struct BinaryReader {
    buffers: VecDeque<Bytes>,
    offset: usize,
    num_unprocessed: usize,
}

impl BinaryReader {
    /// Creates an empty binary reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk to the end of the working buffer.
    ///
    /// Empty chunks are discarded.
    pub fn push(&mut self, buffer: Bytes) {
        if buffer.is_empty() {
            return;
        }

        self.num_unprocessed += buffer.len();
        self.buffers.push_back(buffer);
    }

    /// Gets the number of unprocessed bytes remaining in the working buffer.
    pub fn num_unprocessed_bytes(&self) -> usize {
        self.num_unprocessed
    }

    fn require_unprocessed(&self, size: usize) -> Result<()> {
        if self.num_unprocessed < size {
            return Err(ProtocolError::InsufficientData {
                required: size,
                available: self.num_unprocessed,
            });
        }

        Ok(())
    }

    fn consume(&mut self, size: usize) {
        self.offset += size;
        self.num_unprocessed -= size;

        let current_len = self.buffers.front().map_or(0, Bytes::len);
        if self.offset == current_len {
            self.offset = 0;
            self.buffers.pop_front();
        }
    }

    fn next_byte(&mut self) -> u8 {
        // callers have already checked availability
        let byte = self.buffers.front().expect("buffered byte")[self.offset];
        self.consume(1);
        byte
    }

    /// Reads a `u8` from the working buffer.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.require_unprocessed(1)?;
        Ok(self.next_byte())
    }

    /// Reads a little-endian `u16` from the working buffer.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.require_unprocessed(2)?;

        let mut value = 0u16;
        for i in 0..2 {
            value |= u16::from(self.next_byte()) << (i * 8);
        }

        Ok(value)
    }

    /// Reads a little-endian `u32` from the working buffer.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.require_unprocessed(4)?;

        let mut value = 0u32;
        for i in 0..4 {
            value |= u32::from(self.next_byte()) << (i * 8);
        }

        Ok(value)
    }

    /// Reads a little-endian `u64` from the working buffer.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.require_unprocessed(8)?;

        let low = u64::from(self.read_u32()?);
        let high = u64::from(self.read_u32()?);
        Ok(low | (high << 32))
    }

    /// Reads `size` bytes from the working buffer.
    ///
    /// The returned buffer is a zero-copy slice of the source chunk whenever
    /// the read does not cross a chunk boundary.
    pub fn read_buffer(&mut self, size: usize) -> Result<Bytes> {
        self.require_unprocessed(size)?;

        if 0 == size {
            return Ok(Bytes::new());
        }

        match self.next_buffer_in_place(size) {
            Some(buffer) => Ok(buffer),
            None => Ok(self.next_buffer_out_of_place(size)),
        }
    }

    fn next_buffer_in_place(&mut self, size: usize) -> Option<Bytes> {
        let current = self.buffers.front()?;
        if current.len() - self.offset < size {
            return None;
        }

        let result = current.slice(self.offset..self.offset + size);
        self.consume(size);
        Some(result)
    }

    fn next_buffer_out_of_place(&mut self, size: usize) -> Bytes {
        // the requested run spans multiple chunks, so copy into a new buffer
        let mut result = BytesMut::with_capacity(size);
        let mut remaining = size;
        while 0 < remaining {
            let current = self.buffers.front().expect("buffered chunk");
            let take = remaining.min(current.len() - self.offset);
            result.extend_from_slice(&current[self.offset..self.offset + take]);
            self.consume(take);
            remaining -= take;
        }

        result.freeze()
    }
}
