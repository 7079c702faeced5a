// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Low-level RouterOS API connection handling

mod auth;
mod parse;
mod protocol;
mod state;


use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ApiError, ClientError, Result};
use crate::routeros::reply::Reply;
use crate::routeros::types::ControlWord;

pub use auth::legacy_response;
pub use parse::parse_sentence;
pub use protocol::{MAX_WORD_LENGTH, decode_length, encode_length, read_length};
pub use state::ConnectionState;

/// Default number of consecutive empty word pairs tolerated in a reply
///
/// Some firmware versions emit empty words in a loop (seen after `/login`
/// on old releases), this turns the stall into an error.
pub const DEFAULT_EMPTY_WORD_LIMIT: usize = 10;

/// Word and sentence level dialog with a router over any byte stream
pub struct Connector<S> {
    stream: Option<S>,
    state: ConnectionState,
    empty_word_limit: usize,
}

impl<S> Connector<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an open stream, ready to write the first command
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            state: ConnectionState::WaitingWrite,
            empty_word_limit: DEFAULT_EMPTY_WORD_LIMIT,
        }
    }

    #[must_use]
    pub fn with_empty_word_limit(mut self, limit: usize) -> Self {
        self.empty_word_limit = limit.max(1);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Writes a word, and the empty terminator word when `finalize` is set
    ///
    /// Returns the number of bytes written for `word` (length prefix
    /// included, terminator excluded).
    ///
    /// # Errors
    ///
    /// Fails when disconnected, while a reply is pending, or on I/O errors.
    pub async fn write_word(&mut self, word: &str, finalize: bool) -> Result<usize> {
        let written = self.put_word(word).await?;
        if finalize {
            self.put_word("").await?;
        }
        Ok(written)
    }

    /// Terminates the sentence being written
    ///
    /// # Errors
    ///
    /// Same as [`Connector::write_word`].
    pub async fn write_end(&mut self) -> Result<()> {
        self.put_word("").await.map(|_| ())
    }

    async fn put_word(&mut self, word: &str) -> Result<usize> {
        self.state.ensure_writable()?;
        let stream = self.stream.as_mut().ok_or(ClientError::Disconnected)?;

        let bytes = word.as_bytes();
        let mut frame = encode_length(bytes.len() as u64)?;
        frame.extend_from_slice(bytes);

        self.state = ConnectionState::Writing;
        stream.write_all(&frame).await?;
        if bytes.is_empty() {
            stream.flush().await?;
            tracing::trace!("Sentence sent");
            self.state = ConnectionState::WaitingRead;
        } else {
            tracing::trace!("Sent word of {} bytes", bytes.len());
        }
        Ok(frame.len())
    }

    /// Reads one word, an empty string marks the end of a sentence
    async fn read_word(&mut self) -> Result<String> {
        let stream = self.stream.as_mut().ok_or(ClientError::Disconnected)?;
        let len = read_length(stream).await?;
        if len == 0 {
            return Ok(String::new());
        }
        // the buffer grows with the bytes actually received, not the announced length
        let mut buf = Vec::new();
        let read = stream.take(len).read_to_end(&mut buf).await?;
        if (read as u64) < len {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("word truncated after {read} of {len} bytes"),
            )
            .into());
        }
        Ok(String::from_utf8_lossy(&buf).into())
    }

    /// Reads a complete reply and parses it
    ///
    /// A `!fatal` reply closes the connection, the router drops its end
    /// right after sending one.
    ///
    /// # Errors
    ///
    /// Fails outside the read phase, on I/O or codec errors, on a malformed
    /// reply, or after too many consecutive empty words.
    pub async fn get_sentence(&mut self) -> Result<Reply> {
        let words = self.read_reply().await?;
        let reply = Reply::from_words(&words)?;
        if reply.has_fatal() {
            tracing::warn!(
                "Fatal reply received, closing connection: {}",
                reply.fatal().unwrap_or_default()
            );
            self.close().await;
        }
        Ok(reply)
    }

    /// Reads a complete reply without parsing it
    ///
    /// # Errors
    ///
    /// Same as [`Connector::get_sentence`], except parser errors.
    pub async fn get_raw_sentence(&mut self) -> Result<Vec<String>> {
        let words = self.read_reply().await?;
        if words.iter().any(|w| w == ControlWord::Fatal.as_str()) {
            tracing::warn!("Fatal reply received, closing connection");
            self.close().await;
        }
        Ok(words)
    }

    /// Collects words until a `!done`/`!fatal` block is followed by an empty word
    async fn read_reply(&mut self) -> Result<Vec<String>> {
        self.state.ensure_readable()?;
        self.state = ConnectionState::Reading;

        let mut reply = Vec::new();
        let mut last_block = false;
        let mut empty_pairs = 0;
        let mut word = self.read_word().await?;
        while !last_block || !word.is_empty() {
            if ControlWord::from_word(&word).is_some_and(ControlWord::is_terminal) {
                last_block = true;
            }
            let next = self.read_word().await?;
            if word.is_empty() {
                if next.is_empty() {
                    empty_pairs += 1;
                    if empty_pairs >= self.empty_word_limit {
                        tracing::warn!("Aborting read after {} empty word pairs", empty_pairs);
                        return Err(ApiError::Protocol(
                            "too many consecutive empty words in sentence".to_string(),
                        ));
                    }
                } else {
                    empty_pairs = 0;
                }
            } else {
                tracing::trace!("Received word: {}", word);
                reply.push(word);
                empty_pairs = 0;
            }
            word = next;
        }

        tracing::trace!("Reply complete, {} words received", reply.len());
        self.state = ConnectionState::WaitingWrite;
        Ok(reply)
    }

    /// Ends the session, returning the router's farewell message
    ///
    /// # Errors
    ///
    /// Fails if the router does not answer with a `!fatal` reply.
    pub async fn quit(&mut self) -> Result<String> {
        self.write_word("/quit", true).await?;
        Ok(self.get_sentence().await?.fatal()?)
    }

    /// Closes the stream, safe to call repeatedly
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            tracing::debug!("Closing RouterOS connection");
            if let Err(e) = stream.shutdown().await {
                tracing::debug!("Error while shutting down stream: {}", e);
            }
        }
        self.state = ConnectionState::Disconnected;
    }
}
