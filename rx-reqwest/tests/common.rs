//! Common test utilities

use mockito::{Server, ServerGuard};
use rx_reqwest::{ClientConfig, HttpObservable, Response, RxClient, RxHttpError, Subscription};
use std::time::Duration;
use tokio::sync::mpsc;

/// Notification observed by a test subscriber
#[allow(dead_code)] // Fields are inspected by other test modules
#[derive(Debug)]
pub enum Event<T> {
    Next(Response<T>),
    Error(RxHttpError),
    Complete,
}

/// Create a mock HTTP server for testing
#[allow(dead_code)] // Used by other test modules
pub async fn create_mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Setup a test client pointing to a mock server
#[allow(dead_code)] // Used by other test modules
pub async fn setup_test_client() -> (RxClient, ServerGuard) {
    let server = create_mock_server().await;
    let config = ClientConfig::new()
        .with_base_url(server.url())
        .with_timeout(Duration::from_secs(5));
    let client = RxClient::create(config).unwrap();
    (client, server)
}

/// Subscribe and forward every notification into a channel
#[allow(dead_code)] // Used by other test modules
pub fn subscribe_events<T: Send + 'static>(
    observable: &HttpObservable<T>,
) -> (Subscription, mpsc::UnboundedReceiver<Event<T>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let tx_error = tx.clone();
    let tx_complete = tx.clone();

    let subscription = observable.subscribe_with(
        move |response| {
            let _ = tx.send(Event::Next(response));
        },
        move |error| {
            let _ = tx_error.send(Event::Error(error));
        },
        move || {
            let _ = tx_complete.send(Event::Complete);
        },
    );

    (subscription, rx)
}

/// Collect notifications until the subscription drops its observer
#[allow(dead_code)] // Used by other test modules
pub async fn drain<T>(mut rx: mpsc::UnboundedReceiver<Event<T>>) -> Vec<Event<T>> {
    let mut events = Vec::new();
    let collect = async {
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(5), collect)
        .await
        .expect("subscription never terminated");
    events
}
