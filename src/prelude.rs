// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for convenient use.
//! Users of the library can import everything they need with:
//!
//! ```rust
//! use routeros_api::prelude::*;
//! ```

// Core types
pub use crate::config::ClientConfig;
pub use crate::error::{ApiError, ClientError, Result};

// RouterOS client
pub use crate::routeros::{Attributes, Client, ConnectionState, Connector, Reply};
