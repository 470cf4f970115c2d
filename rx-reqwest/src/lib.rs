//! # rx-reqwest
//!
//! RxJS-style observables over [reqwest](https://docs.rs/reqwest).
//!
//! ## Features
//!
//! - 🧊 **Cold**: building a request does no I/O, subscribing sends it
//! - 1️⃣ **Single-shot**: one response then completion, or one error
//! - ✋ **Cancellable**: unsubscribing aborts the in-flight request
//! - 🔁 **Re-subscribable**: every subscription issues a fresh request
//! - 🛡️ **Type-Safe**: responses decode into any `DeserializeOwned` type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rx_reqwest::{ClientConfig, RxClient};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     name: String,
//!     lastname: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Construct once, pass it around
//!     let client = RxClient::create(ClientConfig::new().with_base_url("http://localhost:8080"))?;
//!
//!     // Subscribe RxJS style...
//!     let subscription = client
//!         .get::<Vec<User>>("/users", None)
//!         .subscribe_next(|response| println!("Users: {:?}", response.data));
//!
//!     // ...and cancel by unsubscribing
//!     subscription.unsubscribe();
//!
//!     // Or simply await the single emission
//!     let response = client.get::<Vec<User>>("/users", None).await?;
//!     println!("Status: {}", response.status);
//!
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod request;
pub mod response;
pub mod rx; // RxJS-style reactive programming

pub use cancel::{AbortController, AbortSignal, CancelToken, CancelTokenSource};
pub use client::{HttpObservable, RxClient};
pub use config::{BasicCredentials, ClientConfig, RequestConfig, ResponseType, ValidateStatus};
pub use error::{Result, RxHttpError};
pub use form::{FormData, FormSerializerOptions, form_to_json, to_form_data};
pub use request::{RequestBody, RequestDescriptor};
pub use response::Response;
pub use rx::{Observable, Observer, Subscription, observify};

// HTTP vocabulary from the underlying client
pub use reqwest::{Method, StatusCode, Url, header};
