// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use std::time::Duration;

use routeros_api::{
    ApiError, Client, ClientConfig, ClientError, ConnectionState, encode_length, read_length,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

const CHALLENGE: &str = "0123456789abcdef0123456789abcdef";

fn sentence(words: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for w in words {
        out.extend(encode_length(w.len() as u64).unwrap());
        out.extend_from_slice(w.as_bytes());
    }
    out.push(0);
    out
}

async fn receive(router: &mut DuplexStream) -> Vec<String> {
    let mut words = Vec::new();
    loop {
        let len = read_length(router).await.unwrap();
        if len == 0 {
            return words;
        }
        let mut buf = vec![0u8; len as usize];
        router.read_exact(&mut buf).await.unwrap();
        words.push(String::from_utf8(buf).unwrap());
    }
}

fn config() -> ClientConfig {
    ClientConfig::new("192.168.88.1", "admin", "secret")
}

/// Router side already holding the legacy login dialog
async fn legacy_router() -> (DuplexStream, DuplexStream) {
    let (client, mut router) = duplex(64 * 1024);
    router
        .write_all(&sentence(&["!done", &format!("=ret={CHALLENGE}")]))
        .await
        .unwrap();
    router.write_all(&sentence(&["!done"])).await.unwrap();
    (client, router)
}

#[tokio::test]
async fn test_auto_login_uses_legacy_method() {
    let (stream, mut router) = legacy_router().await;
    let client = Client::with_stream(config(), stream, false).await.unwrap();
    assert_eq!(client.state(), ConnectionState::WaitingWrite);

    assert_eq!(receive(&mut router).await, vec!["/login"]);
    assert_eq!(
        receive(&mut router).await,
        vec![
            "/login",
            "=name=admin",
            "=response=00ebbe7c3df6b3d902bfd1f355c6e63289"
        ]
    );
}

#[tokio::test]
async fn test_send_with_attributes() {
    let (stream, mut router) = legacy_router().await;
    let mut client = Client::with_stream(config(), stream, false).await.unwrap();
    receive(&mut router).await;
    receive(&mut router).await;

    router
        .write_all(&sentence(&["!done", "=ret=*1A"]))
        .await
        .unwrap();
    let reply = client
        .send("/ip/address/add", &[("address", "10.0.0.1/24"), ("interface", "ether1")])
        .await
        .unwrap();
    assert_eq!(reply.done("ret").unwrap(), "*1A");
    assert_eq!(
        receive(&mut router).await,
        vec![
            "/ip/address/add",
            "=address=10.0.0.1/24",
            "=interface=ether1"
        ]
    );
}

#[tokio::test]
async fn test_send_reports_trap() {
    let (stream, mut router) = legacy_router().await;
    let mut client = Client::with_stream(config(), stream, false).await.unwrap();

    router
        .write_all(&sentence(&["!trap", "=message=no such command"]))
        .await
        .unwrap();
    router.write_all(&sentence(&["!done"])).await.unwrap();
    let reply = client.send("/nothing", &[]).await.unwrap();
    assert!(reply.has_trap());
    assert_eq!(reply.trap("message", 0).unwrap(), "no such command");
    assert_eq!(client.state(), ConnectionState::WaitingWrite);
}

#[tokio::test]
async fn test_send_raw() {
    let (stream, mut router) = legacy_router().await;
    let mut client = Client::with_stream(config(), stream, false).await.unwrap();

    router
        .write_all(&sentence(&["!re", "=name=admin"]))
        .await
        .unwrap();
    router.write_all(&sentence(&["!done"])).await.unwrap();
    let words = client.send_raw("/user/print", &[]).await.unwrap();
    assert_eq!(words, vec!["!re", "=name=admin", "!done"]);
}

#[tokio::test]
async fn test_query() {
    let (stream, mut router) = legacy_router().await;
    let mut client = Client::with_stream(config(), stream, false).await.unwrap();
    receive(&mut router).await;
    receive(&mut router).await;

    router
        .write_all(&sentence(&["!re", "=name=ether1", "=running=true"]))
        .await
        .unwrap();
    router.write_all(&sentence(&["!done"])).await.unwrap();
    let reply = client
        .query("/interface/print", &["?running=true", "?type=ether"])
        .await
        .unwrap();
    assert_eq!(reply.get_re().unwrap()[0].get("name"), Some("ether1"));
    assert_eq!(
        receive(&mut router).await,
        vec!["/interface/print", "?running=true", "?type=ether"]
    );
}

#[tokio::test]
async fn test_query_requires_print() {
    let (stream, _router) = legacy_router().await;
    let mut client = Client::with_stream(config(), stream, false).await.unwrap();
    let err = client
        .query("/interface/set", &["?name=ether1"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Client(ClientError::QueryWithoutPrint(_))
    ));
    // nothing was written, the connection is still usable
    assert_eq!(client.state(), ConnectionState::WaitingWrite);
}

#[tokio::test]
async fn test_non_legacy_login_refused_without_tls() {
    let (stream, mut router) = duplex(4096);
    let mut config = config();
    config.legacy_login = false;

    let err = Client::with_stream(config, stream, false)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ApiError::Client(ClientError::InsecureLogin)));

    // the password never reached the wire
    let mut buf = [0u8; 1];
    assert_eq!(router.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_legacy_login_over_encrypted_stream() {
    let (stream, mut router) = duplex(4096);
    router.write_all(&sentence(&["!done"])).await.unwrap();
    let mut config = config();
    config.legacy_login = false;

    Client::with_stream(config, stream, true).await.unwrap();
    assert_eq!(
        receive(&mut router).await,
        vec!["/login", "=name=admin", "=password=secret"]
    );
}

#[tokio::test]
async fn test_non_legacy_login_insecure_opt_in() {
    let (stream, mut router) = duplex(4096);
    router.write_all(&sentence(&["!done"])).await.unwrap();
    let mut config = config();
    config.legacy_login = false;
    config.insecure_login = true;

    Client::with_stream(config, stream, false).await.unwrap();
    assert_eq!(receive(&mut router).await[2], "=password=secret");
}

#[tokio::test]
async fn test_login_failure() {
    let (stream, mut router) = duplex(4096);
    router
        .write_all(&sentence(&["!done", &format!("=ret={CHALLENGE}")]))
        .await
        .unwrap();
    router
        .write_all(&sentence(&["!trap", "=message=invalid user name or password (6)"]))
        .await
        .unwrap();
    router.write_all(&sentence(&["!done"])).await.unwrap();

    let err = Client::with_stream(config(), stream, false)
        .await
        .err()
        .unwrap();
    assert!(
        matches!(err, ApiError::LoginFailed(ref msg) if msg == "invalid user name or password (6)")
    );
}

#[tokio::test]
async fn test_manual_login() {
    let (stream, mut router) = legacy_router().await;
    let mut config = config();
    config.auto_login = false;

    let mut client = Client::with_stream(config, stream, false).await.unwrap();
    let mut buf = [0u8; 1];
    let pending = tokio::time::timeout(Duration::from_millis(20), router.read(&mut buf)).await;
    assert!(pending.is_err(), "nothing is sent before login()");

    client.login().await.unwrap();
    assert_eq!(receive(&mut router).await, vec!["/login"]);
}

#[tokio::test]
async fn test_quit() {
    let (stream, mut router) = legacy_router().await;
    let mut client = Client::with_stream(config(), stream, false).await.unwrap();

    router
        .write_all(&sentence(&["!fatal", "session terminated on request"]))
        .await
        .unwrap();
    assert_eq!(
        client.quit().await.unwrap(),
        "session terminated on request"
    );
    assert!(!client.is_connected());
    let err = client.send("/interface/print", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Client(ClientError::Disconnected)));
}

#[tokio::test(start_paused = true)]
async fn test_response_timeout() {
    let (stream, _router) = legacy_router().await;
    let mut config = config();
    config.response_timeout_secs = Some(30);
    let mut client = Client::with_stream(config, stream, false).await.unwrap();

    let err = client.send("/system/resource/print", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_secs(30)));
    assert!(!client.is_connected());
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_mid_reply_drops_connection() {
    let (stream, mut router) = legacy_router().await;
    let mut config = config();
    config.response_timeout_secs = Some(30);
    let mut client = Client::with_stream(config, stream, false).await.unwrap();

    // one row arrives, the terminal sentence never does
    router
        .write_all(&sentence(&["!re", "=name=ether1"]))
        .await
        .unwrap();
    let err = client.query("/interface/print", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(_)));
    assert!(!client.is_connected());

    let err = client.send("/interface/print", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Client(ClientError::Disconnected)));
}

#[tokio::test]
async fn test_connect_refuses_tls() {
    let mut config = config();
    config.tls = true;
    let err = Client::connect(config).await.err().unwrap();
    assert!(matches!(err, ApiError::Config(_)));
}

#[tokio::test]
async fn test_connect_validates_config() {
    let config = ClientConfig::new("", "admin", "");
    let err = Client::connect(config).await.err().unwrap();
    assert!(matches!(err, ApiError::Config(_)));
}

#[tokio::test]
async fn test_connect_over_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let router = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut words = Vec::new();
        loop {
            let len = read_length(&mut socket).await.unwrap();
            if len == 0 {
                break;
            }
            let mut buf = vec![0u8; len as usize];
            socket.read_exact(&mut buf).await.unwrap();
            words.push(String::from_utf8(buf).unwrap());
        }
        socket
            .write_all(&sentence(&["!done", "=ret=identity"]))
            .await
            .unwrap();
        words
    });

    let mut config = ClientConfig::new("127.0.0.1", "admin", "");
    config.port = Some(port);
    config.auto_login = false;
    config.connection_timeout_secs = Some(5);
    let mut client = Client::connect(config).await.unwrap();
    let reply = client.send("/system/identity/print", &[]).await.unwrap();
    assert_eq!(reply.done("ret").unwrap(), "identity");
    assert_eq!(router.await.unwrap(), vec!["/system/identity/print"]);
}
