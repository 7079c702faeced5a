use routeros_api::{Client, ClientConfig, Reply, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: routeros-api <command> [name=value | query ...]";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    setup_tracing();

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let args: Vec<String> = args.collect();

    let config = ClientConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;
    tracing::info!("Connecting to {} as '{}'", config.address(), config.login);

    let mut client = Client::connect(config).await.map_err(|e| {
        tracing::error!("Connection failed: {}", e);
        e
    })?;

    let reply = run(&mut client, &command, &args).await;

    // a !fatal reply already closed the session
    if client.is_connected() {
        match client.quit().await {
            Ok(message) => tracing::debug!("Session closed: {}", message),
            Err(e) => tracing::warn!("Quit failed: {}", e),
        }
    }

    let reply = reply?;
    if reply.has_trap() {
        tracing::warn!(
            "Command '{}' failed: {}",
            command,
            reply.trap("message", 0).unwrap_or("unknown error")
        );
    }
    match serde_json::to_string_pretty(reply.parsed()) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to encode reply: {}", e),
    }
    Ok(())
}

/// Print commands take query words verbatim, other commands `name=value` pairs
async fn run(client: &mut Client, command: &str, args: &[String]) -> Result<Reply> {
    if command.ends_with("/print") {
        let queries: Vec<&str> = args.iter().map(String::as_str).collect();
        return client.query(command, &queries).await;
    }

    let attributes: Vec<(&str, &str)> = args
        .iter()
        .map(|arg| {
            let arg = arg.strip_prefix('=').unwrap_or(arg);
            arg.split_once('=').unwrap_or((arg, ""))
        })
        .collect();
    client.send(command, &attributes).await
}

fn setup_tracing() {
    // Use RUST_LOG when set, "info" otherwise
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
