// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # RouterOS API
//!
//! Client for the MikroTik RouterOS API wire protocol.
//!
//! Commands are sentences of length-prefixed words written to the router,
//! replies are sentences of `!re`, `!trap`, `!done` and `!fatal` blocks. This
//! library frames and parses them, authenticates, and gives typed access to
//! the replies over any `tokio` byte stream.
//!
//! ## Main modules
//! - `config`: configuration management
//! - `error`: error types
//! - `routeros`: wire protocol, connection state machine and client
//! - `prelude`: commonly used types and traits

mod config;
mod error;
mod routeros;
pub mod prelude;

// Re-export commonly used types
/// Client configuration
pub use config::{ClientConfig, defaults, env_vars};

/// Error types and result alias
pub use error::{ApiError, ClientError, CodecError, ParseError, Result};

/// Client, connector and reply access
pub use routeros::{
    ABOUT, Attributes, Client, ConnectionState, Connector, ControlWord, DEFAULT_EMPTY_WORD_LIMIT,
    ParsedReply, Reply,
};

/// RouterOS wire protocol primitives
pub use routeros::{
    MAX_WORD_LENGTH, decode_length, encode_length, legacy_response, parse_sentence, read_length,
};
