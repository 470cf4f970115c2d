//! RxJS-style reactive programming for Rust
//!
//! Single-shot observables: one value then completion, or one error.

pub mod observable;

pub use observable::{Observable, Observer, Settle, Subscription, observify};
