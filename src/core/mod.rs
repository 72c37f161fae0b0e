//! # Core Protocol Components
//!
//! Low-level packet handling and binary (de)serialization primitives.
//!
//! This module provides the foundation for the protocol: buffering binary
//! reads tolerant of arbitrary chunking, fixed-buffer writes with exact
//! allocation, and packet framing over a byte stream.
//!
//! ## Components
//! - **Parser**: Chunk-queue binary reader with zero-copy slicing
//! - **Serializer**: Shared write interface with a size-counting twin
//! - **Packet**: Length-prefixed wire format and well-known packet types
//! - **Framer**: Push-based packet framing state machine
//! - **Codec**: Tokio codec adapter for framed transports
//!
//! ## Wire Format
//! ```text
//! [Size(4, LE)] [Type(4, LE)] [Payload(Size - 8)]
//! ```

pub mod codec;
pub mod framer;
pub mod packet;
pub mod parser;
pub mod serializer;
