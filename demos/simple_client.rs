//! Simple IRC client
//!
//! Connects, joins a channel, greets it and answers "hello". Set
//! `RUST_LOG=slirc_client=debug` to watch the reducer work.
//!
//! ```text
//! cargo run --example simple_client -- irc://irc.libera.chat/#example
//! ```

use slirc_client::{Connection, Event, Network, NetworkConfig, Priority, ServerAddress};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "irc://irc.libera.chat/#example".to_string());
    let address: ServerAddress = url.parse()?;
    let channel = if address.suffix.is_empty() {
        "#example".to_string()
    } else {
        address.suffix.clone()
    };

    let config = NetworkConfig {
        name: address.host.clone(),
        nick: "example_bot".into(),
        realname: "slirc-client example".into(),
        autojoin: vec![channel.clone()],
        ..NetworkConfig::default()
    };
    config.validate()?;

    let mut connection = Connection::new(Network::new(config), address)
        .on_certificate_error(|host, reason| {
            eprintln!("rejecting certificate for {}: {}", host, reason);
            false
        });

    connection
        .run(|network, event| match event {
            Event::Welcome { .. } => println!("✓ Registration successful as {}", network.nick()),
            Event::SelfJoin { channel, .. } => {
                println!("→ joined {}", channel.name());
                let _ = network.send_message(
                    channel.name(),
                    "Hello from slirc-client example!",
                    Priority::Normal,
                );
            }
            Event::Privmsg {
                target, user, text, ..
            } => {
                println!("← <{}> {}: {}", target, user.nick, text);
                if text.contains("hello") && network.is_channel_name(&target) {
                    let _ = network.send_message(&target, "Hello there! 👋", Priority::Normal);
                }
            }
            Event::Pong { lag: Some(lag), .. } => println!("lag {} ms", lag),
            Event::Disconnected { reason } => println!("disconnected: {}", reason),
            _ => {}
        })
        .await?;

    Ok(())
}
