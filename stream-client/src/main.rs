use anyhow::Result;
use clap::Parser;
use colored::*;
use domain::Locale;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stream_client::{
    api_client::ApiClient, ConnectionState, Consumer, ConsumerOptions, EventStore, ReconnectPolicy,
};

#[derive(Parser)]
#[command(name = "stream-client")]
#[command(about = "Live article feed over the publish-event stream")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:4000)
    #[arg(long, default_value = "http://localhost:4000")]
    base_url: String,

    /// Locale feed to follow
    #[arg(long, default_value = "en")]
    locale: Locale,

    /// Seconds between reconnect attempts
    #[arg(long, default_value_t = 3)]
    reconnect_delay: u64,

    /// Reconnect attempts before giving up
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    let store = Arc::new(Mutex::new(EventStore::new()));

    // Hydrate from REST before the stream opens; records share the payload
    // shape, so stream envelopes merge straight over them.
    println!("{} Hydrating from {}...", "→".blue(), cli.base_url);
    let api_client = ApiClient::new(reqwest::Client::new(), cli.base_url.clone());
    match api_client.list_articles(cli.locale).await {
        Ok(records) => {
            println!("{} Loaded {} published articles", "✓".green(), records.len());
            if let Ok(mut store) = store.lock() {
                store.hydrate(records);
            }
        }
        Err(e) => {
            println!("{} Hydration failed: {e}", "✗".red());
        }
    }

    let endpoint = format!(
        "{}/events/{}",
        cli.base_url,
        events::channel::article_updates(cli.locale)
    );
    println!("{} Subscribing to {}", "→".blue(), endpoint);

    let options = ConsumerOptions {
        policy: ReconnectPolicy {
            delay: Duration::from_secs(cli.reconnect_delay),
            max_attempts: cli.max_attempts,
        },
        cookie: None,
    };

    let consumer = Consumer::open(endpoint, options, {
        let store = store.clone();
        move |envelope| {
            println!(
                "{} {} [{}] {}",
                "•".cyan(),
                envelope.action.event_name().bold(),
                envelope.payload.locale,
                envelope.payload.title
            );
            if let Ok(mut store) = store.lock() {
                store.merge(&envelope);
                println!("  {} records cached", store.len());
            }
        }
    });

    // Surface every connection-state transition.
    let mut status_rx = consumer.subscribe_status();
    let status_task = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = *status_rx.borrow();
            let label = match status.state {
                ConnectionState::Connecting => "connecting".yellow(),
                ConnectionState::Connected => "connected".green(),
                ConnectionState::Error => "error".red(),
                ConnectionState::Disconnected => "disconnected".red().bold(),
            };
            println!(
                "{} Connection {} (attempts: {})",
                "→".blue(),
                label,
                status.attempts
            );
            if status.state == ConnectionState::Disconnected {
                break;
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    println!("\n{} Closing stream", "→".blue());
    consumer.close();
    status_task.abort();

    Ok(())
}
