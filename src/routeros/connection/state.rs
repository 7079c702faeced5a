// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Connection phase tracking

use std::fmt;

use crate::error::ClientError;

/// Phase of the request/response dialog
///
/// A sentence is written completely, then its reply is read completely,
/// before the next command may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    WaitingWrite,
    Writing,
    WaitingRead,
    Reading,
}

impl ConnectionState {
    /// Checks that a word may be written
    ///
    /// # Errors
    ///
    /// [`ClientError::Disconnected`] once closed, [`ClientError::ReadPending`]
    /// while a reply is still expected.
    pub fn ensure_writable(self) -> Result<(), ClientError> {
        match self {
            Self::WaitingWrite | Self::Writing => Ok(()),
            Self::Disconnected => Err(ClientError::Disconnected),
            Self::WaitingRead | Self::Reading => Err(ClientError::ReadPending),
        }
    }

    /// Checks that a reply may be read
    ///
    /// # Errors
    ///
    /// [`ClientError::Disconnected`] once closed, [`ClientError::WritePending`]
    /// before the command sentence was terminated.
    pub fn ensure_readable(self) -> Result<(), ClientError> {
        match self {
            Self::WaitingRead | Self::Reading => Ok(()),
            Self::Disconnected => Err(ClientError::Disconnected),
            Self::WaitingWrite | Self::Writing => Err(ClientError::WritePending),
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::WaitingWrite => "waiting write",
            Self::Writing => "writing",
            Self::WaitingRead => "waiting read",
            Self::Reading => "reading",
        };
        f.write_str(name)
    }
}
