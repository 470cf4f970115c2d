//! RxJS-style HTTP Example
//!
//! Subscribes to a GET request, cancels another one mid-flight, and awaits a
//! third as a plain future.
//!
//! Usage:
//!   cargo run --example rxjs_style -- https://jsonplaceholder.typicode.com

use rx_reqwest::{ClientConfig, RequestConfig, RxClient};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Deserialize)]
struct Todo {
    id: u64,
    title: String,
    completed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://jsonplaceholder.typicode.com".to_string());

    println!("🎯 rx-reqwest - RxJS-style HTTP Example\n");

    let client = RxClient::create(
        ClientConfig::new()
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(10)),
    )?;

    // Example 1: subscribe with next/error/complete
    println!("1. Subscribe");
    let (done_tx, done_rx) = oneshot::channel();
    let _subscription = client.get::<Todo>("/todos/1", None).subscribe_with(
        |response| {
            let todo = response.data;
            println!(
                "   📨 {} #{}: {} (completed: {})",
                response.status, todo.id, todo.title, todo.completed
            );
        },
        |error| eprintln!("   ❌ {}", error),
        move || {
            println!("   ✅ Complete");
            let _ = done_tx.send(());
        },
    );
    let _ = tokio::time::timeout(Duration::from_secs(10), done_rx).await;

    // Example 2: unsubscribe to cancel
    println!("\n2. Unsubscribe");
    let subscription = client
        .get::<Vec<Todo>>("/todos", None)
        .subscribe_next(|response| println!("   never printed: {}", response.data.len()));
    subscription.unsubscribe();
    println!("   ✋ Request cancelled (closed: {})", subscription.is_closed());

    // Example 3: await the single emission
    println!("\n3. Await");
    let config = RequestConfig::new().with_param("userId", "1");
    let response = client.get::<Vec<Todo>>("/todos", Some(config)).await?;
    println!("   📦 {} todos for user 1", response.data.len());

    Ok(())
}
