// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! High-level RouterOS client

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::connection::{ConnectionState, Connector};
use super::reply::Reply;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError, Result};

/// `MikroTik` `RouterOS` API client
///
/// Resolves the login method from its configuration and builds command
/// sentences on top of a [`Connector`].
pub struct Client<S = TcpStream> {
    config: ClientConfig,
    connector: Connector<S>,
    encrypted: bool,
}

impl Client<TcpStream> {
    /// Opens a plain TCP connection and logs in when `auto_login` is set
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, asks for TLS, or if
    /// connection or authentication fails.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(ApiError::Config)?;
        if config.tls {
            return Err(ApiError::Config(
                "TLS streams must be opened by the caller and passed to Client::with_stream"
                    .to_string(),
            ));
        }

        let addr = config.address();
        tracing::trace!("Attempting TCP connection to: {}", addr);
        let stream = match config.connection_timeout() {
            Some(limit) => timeout(limit, TcpStream::connect(addr.as_str()))
                .await
                .map_err(|_| ApiError::Timeout(limit))??,
            None => TcpStream::connect(addr.as_str()).await?,
        };
        tracing::trace!("TCP connection established to: {}", addr);

        Self::with_stream(config, stream, false).await
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an open stream, `encrypted` telling whether it is a TLS stream
    ///
    /// # Errors
    ///
    /// Returns an error if `auto_login` is set and login fails.
    pub async fn with_stream(config: ClientConfig, stream: S, encrypted: bool) -> Result<Self> {
        let connector = Connector::new(stream).with_empty_word_limit(config.max_empty_words);
        let mut client = Self {
            config,
            connector,
            encrypted,
        };
        if client.config.auto_login {
            client.login().await?;
        }
        Ok(client)
    }

    /// Logs in with the configured method
    ///
    /// Non legacy login sends the password in clear text, so it is refused
    /// on an unencrypted stream unless `insecure_login` is set.
    ///
    /// # Errors
    ///
    /// [`ClientError::InsecureLogin`] when refused by the policy above,
    /// otherwise the login errors of the [`Connector`].
    pub async fn login(&mut self) -> Result<()> {
        let Self {
            config,
            connector,
            encrypted,
        } = self;
        if config.legacy_login {
            return connector
                .legacy_login(&config.login, &config.password)
                .await;
        }
        if !*encrypted && !config.insecure_login {
            return Err(ClientError::InsecureLogin.into());
        }
        connector
            .non_legacy_login(&config.login, &config.password, true)
            .await
    }

    /// Sends a command with `=name=value` attributes
    ///
    /// # Errors
    ///
    /// Returns an error if the dialog fails or the reply is malformed.
    pub async fn send(&mut self, command: &str, attributes: &[(&str, &str)]) -> Result<Reply> {
        self.write_command(command, attributes).await?;
        let reply =
            with_timeout(self.config.response_timeout(), self.connector.get_sentence()).await;
        self.close_on_timeout(reply).await
    }

    /// Same as [`Client::send`] without parsing the reply
    ///
    /// # Errors
    ///
    /// Returns an error if the dialog fails.
    pub async fn send_raw(
        &mut self,
        command: &str,
        attributes: &[(&str, &str)],
    ) -> Result<Vec<String>> {
        self.write_command(command, attributes).await?;
        let words = with_timeout(
            self.config.response_timeout(),
            self.connector.get_raw_sentence(),
        )
        .await;
        self.close_on_timeout(words).await
    }

    /// Sends a `print` command followed by query words written verbatim
    ///
    /// # Errors
    ///
    /// [`ClientError::QueryWithoutPrint`] if `command` does not end with
    /// `/print`, otherwise same as [`Client::send`].
    pub async fn query(&mut self, command: &str, queries: &[&str]) -> Result<Reply> {
        if !command.ends_with("/print") {
            return Err(ClientError::QueryWithoutPrint(command.to_string()).into());
        }
        self.connector.write_word(command, false).await?;
        for query in queries {
            self.connector.write_word(query, false).await?;
        }
        self.connector.write_end().await?;
        let reply =
            with_timeout(self.config.response_timeout(), self.connector.get_sentence()).await;
        self.close_on_timeout(reply).await
    }

    /// Ends the session, returning the router's farewell message
    ///
    /// # Errors
    ///
    /// Returns an error if the router does not answer with `!fatal`.
    pub async fn quit(&mut self) -> Result<String> {
        self.connector.write_word("/quit", true).await?;
        let reply =
            with_timeout(self.config.response_timeout(), self.connector.get_sentence()).await;
        let reply = self.close_on_timeout(reply).await?;
        Ok(reply.fatal()?)
    }

    pub async fn close(&mut self) {
        self.connector.close().await;
    }

    pub fn is_connected(&self) -> bool {
        self.connector.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.connector.state()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Direct word level access
    pub fn connector_mut(&mut self) -> &mut Connector<S> {
        &mut self.connector
    }

    async fn write_command(&mut self, command: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.connector.write_word(command, false).await?;
        for (name, value) in attributes {
            self.connector
                .write_word(&format!("={name}={value}"), false)
                .await?;
        }
        self.connector.write_end().await
    }

    /// A reply cut off by the response timeout leaves the stream mid
    /// sentence, so the connection cannot be reused
    async fn close_on_timeout<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ApiError::Timeout(limit)) = &result {
            tracing::warn!("No reply within {:?}, closing connection", limit);
            self.connector.close().await;
        }
        result
    }
}

/// Applies the response timeout, if any, to a read
async fn with_timeout<T>(
    limit: Option<Duration>,
    read: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => timeout(limit, read)
            .await
            .map_err(|_| ApiError::Timeout(limit))?,
        None => read.await,
    }
}
