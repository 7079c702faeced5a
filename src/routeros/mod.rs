//! `MikroTik` `RouterOS` API client module
//!
//! This module implements the `RouterOS` API wire protocol: word framing,
//! reply parsing, authentication and a small command front end.

mod client;
mod connection;
mod reply;
mod types;

// Re-export public types and functions
pub use client::Client;
pub use connection::{
    ConnectionState, Connector, DEFAULT_EMPTY_WORD_LIMIT, MAX_WORD_LENGTH, decode_length,
    encode_length, legacy_response, parse_sentence, read_length,
};
pub use reply::Reply;
pub use types::{ABOUT, Attributes, ControlWord, ParsedReply};
