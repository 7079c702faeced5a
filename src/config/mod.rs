// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for the RouterOS API client
//!
//! Loads and parses configuration from environment variables and JSON.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ApiError, Result};


/// Default configuration values
pub mod defaults {
    pub const API_PORT: u16 = 8728;
    pub const API_TLS_PORT: u16 = 8729;
    pub const LOGIN: &str = "admin";
    pub const PASSWORD: &str = "";
    pub const MAX_EMPTY_WORDS: usize = crate::routeros::DEFAULT_EMPTY_WORD_LIMIT;
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const CONFIG: &str = "ROUTEROS_CONFIG";
    pub const HOST: &str = "ROUTEROS_HOST";
    pub const PORT: &str = "ROUTEROS_PORT";
    pub const LOGIN: &str = "ROUTEROS_USERNAME";
    pub const PASSWORD: &str = "ROUTEROS_PASSWORD";
    pub const LEGACY_LOGIN: &str = "ROUTEROS_LEGACY_LOGIN";
    pub const TLS: &str = "ROUTEROS_TLS";
    pub const INSECURE_LOGIN: &str = "ROUTEROS_INSECURE_LOGIN";
    pub const CONNECTION_TIMEOUT: &str = "ROUTEROS_CONNECTION_TIMEOUT_SECONDS";
    pub const RESPONSE_TIMEOUT: &str = "ROUTEROS_RESPONSE_TIMEOUT_SECONDS";
    pub const AUTO_LOGIN: &str = "ROUTEROS_AUTO_LOGIN";
    pub const MAX_EMPTY_WORDS: &str = "ROUTEROS_MAX_EMPTY_WORDS";
}

fn default_login() -> String {
    defaults::LOGIN.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_empty_words() -> usize {
    defaults::MAX_EMPTY_WORDS
}

/// Connection and login options for one router
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    pub host: String,
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default)]
    pub password: String,
    /// Challenge-response login, never sends the password in clear text
    #[serde(default = "default_true")]
    pub legacy_login: bool,
    /// The transport is encrypted (the TLS stream is supplied by the caller)
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub connection_timeout_secs: Option<u64>,
    #[serde(default)]
    pub response_timeout_secs: Option<u64>,
    #[serde(default = "default_true")]
    pub auto_login: bool,
    /// Allows non legacy login over an unencrypted transport
    #[serde(default)]
    pub insecure_login: bool,
    #[serde(default = "default_max_empty_words")]
    pub max_empty_words: usize,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("legacy_login", &self.legacy_login)
            .field("tls", &self.tls)
            .field("port", &self.port())
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .field("response_timeout_secs", &self.response_timeout_secs)
            .field("auto_login", &self.auto_login)
            .field("insecure_login", &self.insecure_login)
            .field("max_empty_words", &self.max_empty_words)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration with default options
    pub fn new(
        host: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            login: login.into(),
            password: password.into(),
            legacy_login: true,
            tls: false,
            port: None,
            connection_timeout_secs: None,
            response_timeout_secs: None,
            auto_login: true,
            insecure_login: false,
            max_empty_words: defaults::MAX_EMPTY_WORDS,
        }
    }

    /// API port, defaulting to the standard port for the transport
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(if self.tls {
            defaults::API_TLS_PORT
        } else {
            defaults::API_PORT
        })
    }

    /// `host:port` address to connect to
    #[must_use]
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            // bare IPv6 literal
            format!("[{}]:{}", self.host, self.port())
        } else {
            format!("{}:{}", self.host, self.port())
        }
    }

    #[must_use]
    pub fn connection_timeout(&self) -> Option<Duration> {
        self.connection_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_secs.map(Duration::from_secs)
    }

    /// Validates router configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Router host cannot be empty".to_string());
        }

        if self.login.trim().is_empty() {
            return Err(format!("Login cannot be empty for router '{}'", self.host));
        }

        if self.port == Some(0) {
            return Err(format!("Invalid port 0 for router '{}'", self.host));
        }

        if self.max_empty_words == 0 {
            return Err("max_empty_words must be at least 1".to_string());
        }

        Ok(())
    }

    /// Loads configuration from environment variables
    ///
    /// `ROUTEROS_CONFIG` may hold the whole configuration as JSON, otherwise
    /// each option is read from its own `ROUTEROS_*` variable.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the host is missing, a value does not
    /// parse, or validation fails.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = if let Some(config_json) = var(env_vars::CONFIG) {
            serde_json::from_str::<Self>(&config_json).map_err(|e| {
                ApiError::Config(format!("Failed to parse {}: {e}", env_vars::CONFIG))
            })?
        } else {
            let host = var(env_vars::HOST)
                .ok_or_else(|| ApiError::Config(format!("{} is not set", env_vars::HOST)))?;
            let login = var(env_vars::LOGIN).unwrap_or_else(|| defaults::LOGIN.to_string());
            let password =
                var(env_vars::PASSWORD).unwrap_or_else(|| defaults::PASSWORD.to_string());

            let mut config = Self::new(host, login, password);
            config.port = env_parse(&var, env_vars::PORT)?;
            config.connection_timeout_secs = env_parse(&var, env_vars::CONNECTION_TIMEOUT)?;
            config.response_timeout_secs = env_parse(&var, env_vars::RESPONSE_TIMEOUT)?;
            if let Some(legacy) = env_flag(&var, env_vars::LEGACY_LOGIN)? {
                config.legacy_login = legacy;
            }
            if let Some(tls) = env_flag(&var, env_vars::TLS)? {
                config.tls = tls;
            }
            if let Some(insecure) = env_flag(&var, env_vars::INSECURE_LOGIN)? {
                config.insecure_login = insecure;
            }
            if let Some(auto_login) = env_flag(&var, env_vars::AUTO_LOGIN)? {
                config.auto_login = auto_login;
            }
            if let Some(limit) = env_parse(&var, env_vars::MAX_EMPTY_WORDS)? {
                config.max_empty_words = limit;
            }
            config
        };

        config.validate().map_err(ApiError::Config)?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApiError::Config(format!("Invalid value '{value}' for {name}"))),
        None => Ok(None),
    }
}

fn env_flag(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<bool>> {
    match var(name) {
        Some(value) => parse_flag(&value)
            .map(Some)
            .ok_or_else(|| ApiError::Config(format!("Invalid boolean '{value}' for {name}"))),
        None => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
