// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Error types for the RouterOS API client

use std::time::Duration;

use thiserror::Error;

/// Word length prefix encoding/decoding error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Length does not fit in the 35 bits of the widest prefix
    #[error("word length {0:#X} exceeds the maximum encodable length")]
    TooLarge(u64),

    /// Leading byte has its five high bits set (reserved control byte)
    #[error("unexpected control byte {0:#04X} in word length prefix")]
    ControlByte(u8),

    /// Prefix ends before all the bytes announced by its first byte
    #[error("truncated length prefix: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Sentence parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty response from router")]
    EmptyResponse,

    #[error("not a valid reply word at start: {0}")]
    NotAReplyWord(String),

    #[error("end of data without !done or !fatal")]
    MissingTerminal,

    /// `!done` and `!fatal` close a sentence, nothing may follow them
    #[error("!done and !fatal are final states, received {0}")]
    AfterTerminal(String),

    #[error("invalid attribute {0}")]
    InvalidAttribute(String),

    #[error("duplicate attribute key {0}")]
    DuplicateAttribute(String),

    #[error("tagged responses are not supported")]
    TaggedResponse,

    #[error("unknown attribute format {0}")]
    UnknownAttributeFormat(String),

    #[error("internal parser error")]
    Internal,
}

/// Caller misuse: wrong protocol phase or a missing reply block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("stream disconnected")]
    Disconnected,

    #[error("cannot write to stream, have to read all data first")]
    ReadPending,

    #[error("cannot read from stream, have to finalize command first")]
    WritePending,

    #[error("reply does not contain {0} block")]
    MissingBlock(&'static str),

    #[error("attribute {key} does not exist in {block} block")]
    MissingAttribute { block: &'static str, key: String },

    #[error("router does not accept the non legacy login method")]
    NonLegacyUnsupported,

    #[error("non legacy login sends the password in clear text, enable insecure_login to use it without TLS")]
    InsecureLogin,

    #[error("queries must end with /print, {0} received")]
    QueryWithoutPrint(String),
}

/// Main error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Word length codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Malformed reply sentence
    #[error("Parser error: {0}")]
    Parse(#[from] ParseError),

    /// Incoherent dialog with the router
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Router rejected the credentials
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Operation not allowed in the current state
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// No reply within the configured response timeout
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Convenient alias for Result with the crate error
pub type Result<T> = std::result::Result<T, ApiError>;
