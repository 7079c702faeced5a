// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Read-only access to a parsed reply

use crate::error::{ClientError, ParseError};
use crate::routeros::connection::parse_sentence;
use crate::routeros::types::{Attributes, ControlWord, ParsedReply};

type Result<T> = std::result::Result<T, ClientError>;

/// Parsed reply to one command
///
/// Accessors for a block the router did not send fail with
/// [`ClientError::MissingBlock`], which is how callers detect that a command
/// did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    parsed: ParsedReply,
}

impl Reply {
    /// Parses the raw words of a sentence
    ///
    /// # Errors
    ///
    /// Returns the parser error for a malformed sentence.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> std::result::Result<Self, ParseError> {
        Ok(Self {
            parsed: parse_sentence(words)?,
        })
    }

    #[must_use]
    pub fn parsed(&self) -> &ParsedReply {
        &self.parsed
    }

    #[must_use]
    pub fn into_parsed(self) -> ParsedReply {
        self.parsed
    }

    #[must_use]
    pub fn has_re(&self) -> bool {
        self.parsed.re.is_some()
    }

    /// `!re` rows, one per returned item
    pub fn get_re(&self) -> Result<&[Attributes]> {
        self.parsed
            .re
            .as_deref()
            .ok_or(ClientError::MissingBlock(ControlWord::Re.as_str()))
    }

    #[must_use]
    pub fn has_trap(&self) -> bool {
        self.parsed.trap.is_some()
    }

    pub fn get_trap(&self) -> Result<&[Attributes]> {
        self.parsed
            .trap
            .as_deref()
            .ok_or(ClientError::MissingBlock(ControlWord::Trap.as_str()))
    }

    /// Attribute `key` of the trap block at `index` (usually 0)
    pub fn trap(&self, key: &str, index: usize) -> Result<&str> {
        self.get_trap()?
            .get(index)
            .and_then(|block| block.get(key))
            .ok_or_else(|| ClientError::MissingAttribute {
                block: ControlWord::Trap.as_str(),
                key: key.to_string(),
            })
    }

    #[must_use]
    pub fn has_done(&self) -> bool {
        self.parsed.done.is_some()
    }

    pub fn get_done(&self) -> Result<&Attributes> {
        self.parsed
            .done
            .as_ref()
            .ok_or(ClientError::MissingBlock(ControlWord::Done.as_str()))
    }

    /// Number of attributes in the done block
    pub fn count_done(&self) -> Result<usize> {
        Ok(self.get_done()?.len())
    }

    /// Single valued attribute of the done block
    ///
    /// `.about` may repeat and is never returned here, read it with
    /// `get_done()?.about()`.
    pub fn done(&self, key: &str) -> Result<&str> {
        self.get_done()?
            .get(key)
            .ok_or_else(|| ClientError::MissingAttribute {
                block: ControlWord::Done.as_str(),
                key: key.to_string(),
            })
    }

    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.parsed.fatal.is_some()
    }

    pub fn get_fatal(&self) -> Result<&[String]> {
        self.parsed
            .fatal
            .as_deref()
            .ok_or(ClientError::MissingBlock(ControlWord::Fatal.as_str()))
    }

    /// Fatal message fragments joined with spaces
    pub fn fatal(&self) -> Result<String> {
        Ok(self.get_fatal()?.join(" "))
    }
}
