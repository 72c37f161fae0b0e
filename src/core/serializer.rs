//! # Binary Serialization Sinks
//!
//! One write interface, two sinks: [`BinaryWriter`] writes into a single
//! pre-sized buffer and fails immediately on overflow, while
//! [`SizeCalculator`] implements the identical interface but only accumulates
//! a running total. Together they enable the measure-then-write strategy used
//! throughout the codec layer: run an encoder once against the calculator,
//! allocate exactly that many bytes, then run it again against the writer.
//! The result is exact allocation with zero resizing.
//!
//! All integer writes are little-endian.

use crate::error::{ProtocolError, Result};

/// Common interface shared by all serialization sinks.
pub trait Serializer {
    /// Writes a `u8` to the working buffer.
    fn write_u8(&mut self, value: u8) -> Result<()>;

    /// Writes a little-endian `u16` to the working buffer.
    fn write_u16(&mut self, value: u16) -> Result<()>;

    /// Writes a little-endian `u32` to the working buffer.
    fn write_u32(&mut self, value: u32) -> Result<()>;

    /// Writes a little-endian `u64` to the working buffer.
    fn write_u64(&mut self, value: u64) -> Result<()>;

    /// Writes a run of bytes to the working buffer.
    fn write_bytes(&mut self, buffer: &[u8]) -> Result<()>;
}

/// Serialization sink targeting one fixed-size buffer.
#[derive(Debug)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
    offset: usize,
}

impl BinaryWriter {
    /// Creates a binary writer over a zeroed buffer of `size` bytes.
    pub fn new(size: usize) -> Result<Self> {
        if 0 == size {
            return Err(ProtocolError::ZeroBufferSize);
        }

        Ok(Self {
            buffer: vec![0; size],
            offset: 0,
        })
    }

    /// Gets the size of the underlying fixed-size buffer.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Gets the number of bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.offset
    }

    /// Consumes the writer and returns the underlying buffer.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// Gets a view of the underlying buffer.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn require_buffer_space(&self, size: usize) -> Result<()> {
        let bytes_left = self.buffer.len() - self.offset;
        if size > bytes_left {
            return Err(ProtocolError::InsufficientBufferSpace {
                required: size,
                available: bytes_left,
            });
        }

        Ok(())
    }
}

impl Serializer for BinaryWriter {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.require_buffer_space(1)?;
        self.buffer[self.offset] = value;
        self.offset += 1;
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.require_buffer_space(2)?;
        self.buffer[self.offset..self.offset + 2].copy_from_slice(&value.to_le_bytes());
        self.offset += 2;
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.require_buffer_space(4)?;
        self.buffer[self.offset..self.offset + 4].copy_from_slice(&value.to_le_bytes());
        self.offset += 4;
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.require_buffer_space(8)?;
        self.buffer[self.offset..self.offset + 8].copy_from_slice(&value.to_le_bytes());
        self.offset += 8;
        Ok(())
    }

    fn write_bytes(&mut self, buffer: &[u8]) -> Result<()> {
        self.require_buffer_space(buffer.len())?;
        self.buffer[self.offset..self.offset + buffer.len()].copy_from_slice(buffer);
        self.offset += buffer.len();
        Ok(())
    }
}

/// Serialization sink that calculates the serialized size without writing.
#[derive(Debug, Default)]
pub struct SizeCalculator {
    total_size: usize,
}

impl SizeCalculator {
    /// Creates a serialized size calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the calculated size.
    pub fn size(&self) -> usize {
        self.total_size
    }
}

impl Serializer for SizeCalculator {
    fn write_u8(&mut self, _value: u8) -> Result<()> {
        self.total_size += 1;
        Ok(())
    }

    fn write_u16(&mut self, _value: u16) -> Result<()> {
        self.total_size += 2;
        Ok(())
    }

    fn write_u32(&mut self, _value: u32) -> Result<()> {
        self.total_size += 4;
        Ok(())
    }

    fn write_u64(&mut self, _value: u64) -> Result<()> {
        self.total_size += 8;
        Ok(())
    }

    fn write_bytes(&mut self, buffer: &[u8]) -> Result<()> {
        self.total_size += buffer.len();
        Ok(())
    }
}
