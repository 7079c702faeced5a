// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS authentication

use md5::compute as md5_compute;
use tokio::io::{AsyncRead, AsyncWrite};

use super::Connector;
use crate::error::{ApiError, ClientError, Result};
use crate::routeros::reply::Reply;

/// Computes the legacy login response for a hex challenge
///
/// `"00"` followed by the hex MD5 of a zero byte, the password and the
/// decoded challenge bytes.
///
/// # Errors
///
/// Returns a protocol error if the challenge is not valid hex.
pub fn legacy_response(password: &str, challenge_hex: &str) -> Result<String> {
    let challenge = hex::decode(challenge_hex)
        .map_err(|e| ApiError::Protocol(format!("invalid login challenge: {e}")))?;

    let mut data = Vec::with_capacity(1 + password.len() + challenge.len());
    data.push(0u8);
    data.extend_from_slice(password.as_bytes());
    data.extend_from_slice(&challenge);
    let digest = md5_compute(&data);
    let mut response = String::from("00");
    response.push_str(&hex::encode(digest.0));
    Ok(response)
}

/// Outcome of a `/login` exchange
fn check_login(reply: &Reply) -> Result<bool> {
    if reply.has_trap() {
        let message = reply.trap("message", 0).unwrap_or("login failure");
        tracing::trace!("Login failed with message: {}", message);
        return Err(ApiError::LoginFailed(message.to_string()));
    }
    Ok(reply.count_done()? == 0)
}

impl<S> Connector<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Challenge-response login (the only method before RouterOS 6.43)
    ///
    /// The password never leaves the client in clear text.
    ///
    /// # Errors
    ///
    /// [`ApiError::LoginFailed`] when the router rejects the credentials,
    /// a protocol error on any unexpected reply.
    pub async fn legacy_login(&mut self, login: &str, password: &str) -> Result<()> {
        tracing::trace!("Requesting challenge for legacy login of user: {}", login);
        self.write_word("/login", true).await?;
        let reply = self.get_sentence().await?;
        let challenge = reply.done("ret")?;
        tracing::trace!("Challenge received, length: {}", challenge.len());
        let response = legacy_response(password, challenge)?;

        self.write_word("/login", false).await?;
        self.write_word(&format!("=name={login}"), false).await?;
        self.write_word(&format!("=response={response}"), true)
            .await?;
        let reply = self.get_sentence().await?;

        if check_login(&reply)? {
            tracing::debug!("Login successful (legacy method)");
            return Ok(());
        }
        Err(ApiError::Protocol(
            "unexpected attributes in legacy login reply".to_string(),
        ))
    }

    /// Plain login sending the password as is (RouterOS 6.43+)
    ///
    /// Only safe over an encrypted transport. With `fallback_legacy_login`,
    /// a router answering with a challenge is logged in with
    /// [`Connector::legacy_login`] instead.
    ///
    /// # Errors
    ///
    /// [`ApiError::LoginFailed`] when the router rejects the credentials,
    /// [`ClientError::NonLegacyUnsupported`] when it answers with a challenge
    /// and fallback is disabled.
    pub async fn non_legacy_login(
        &mut self,
        login: &str,
        password: &str,
        fallback_legacy_login: bool,
    ) -> Result<()> {
        tracing::trace!("Attempting login for user: {}", login);
        self.write_word("/login", false).await?;
        self.write_word(&format!("=name={login}"), false).await?;
        self.write_word(&format!("=password={password}"), true)
            .await?;
        let reply = self.get_sentence().await?;

        if check_login(&reply)? {
            tracing::debug!("Login successful (new method)");
            return Ok(());
        }

        if !fallback_legacy_login {
            return Err(ClientError::NonLegacyUnsupported.into());
        }
        // a challenge means the firmware only knows the legacy method
        reply.done("ret")?;
        tracing::debug!("Router answered with a challenge, trying legacy method");
        self.legacy_login(login, password).await
    }
}
