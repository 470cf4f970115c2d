//! Single-shot Observable (RxJS-like)
//!
//! An [`Observable`] here wraps a request-issuing function. It is cold: nothing
//! runs until it is subscribed to, and every subscription invokes the function
//! again with its own [`AbortSignal`]. A subscription sees `next` followed by
//! `complete`, or a single `error`, or nothing if it unsubscribed first.

use crate::cancel::{AbortController, AbortSignal};
use futures::future::BoxFuture;
use futures::{FutureExt, Stream};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

type Producer<T, E> = dyn Fn(AbortSignal) -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// Observer trait - similar to RxJS Observer
pub trait Observer<T, E>: Send {
    fn next(&mut self, value: T);
    fn error(&mut self, error: E);
    fn complete(&mut self);
}

struct FnObserver<N, Er, C> {
    next: Option<N>,
    error: Option<Er>,
    complete: Option<C>,
}

impl<T, E, N, Er, C> Observer<T, E> for FnObserver<N, Er, C>
where
    N: FnOnce(T) + Send,
    Er: FnOnce(E) + Send,
    C: FnOnce() + Send,
{
    fn next(&mut self, value: T) {
        if let Some(next) = self.next.take() {
            next(value);
        }
    }

    fn error(&mut self, error: E) {
        if let Some(error_fn) = self.error.take() {
            error_fn(error);
        }
    }

    fn complete(&mut self) {
        if let Some(complete) = self.complete.take() {
            complete();
        }
    }
}

struct SubscriptionInner {
    is_closed: AtomicBool,
    controller: AbortController,
}

impl SubscriptionInner {
    /// Claims the terminal transition. Only the first caller gets `true`.
    fn close(&self) -> bool {
        self.is_closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Subscription handle - similar to RxJS Subscription
///
/// Dropping a handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    fn new(controller: AbortController) -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                is_closed: AtomicBool::new(false),
                controller,
            }),
        }
    }

    /// Unsubscribe from the observable
    ///
    /// If the request has not settled yet its signal is aborted and its
    /// outcome will never reach the observer. After settlement this is a no-op.
    pub fn unsubscribe(&self) {
        if self.inner.close() && self.inner.controller.abort() {
            tracing::debug!("subscription closed before settlement, request aborted");
        }
    }

    /// Whether the subscription has terminated or been unsubscribed
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed.load(Ordering::Acquire)
    }
}

/// Cold, at-most-one-emission observable
pub struct Observable<T, E> {
    producer: Arc<Producer<T, E>>,
}

impl<T, E> Clone for Observable<T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T: Send + 'static, E: Send + 'static> Observable<T, E> {
    /// Create an Observable from a request-issuing function
    pub fn new<F, Fut>(make_request: F) -> Self
    where
        F: Fn(AbortSignal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            producer: Arc::new(move |signal| make_request(signal).boxed()),
        }
    }

    /// Subscribe an [`Observer`]
    ///
    /// Spawns the request on the current tokio runtime.
    pub fn subscribe<O>(&self, mut observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        let controller = AbortController::new();
        let request = (self.producer)(controller.signal());
        let subscription = Subscription::new(controller);
        let inner = Arc::clone(&subscription.inner);

        tokio::spawn(async move {
            let outcome = request.await;

            if !inner.close() {
                tracing::trace!("request settled after unsubscribe, outcome discarded");
                return;
            }

            match outcome {
                Ok(value) => {
                    observer.next(value);
                    observer.complete();
                }
                Err(error) => observer.error(error),
            }
        });

        subscription
    }

    /// Subscribe with next/error/complete callbacks (RxJS style)
    ///
    /// # Example
    /// ```no_run
    /// # use rx_reqwest::rx::Observable;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let obs: Observable<u32, String> = Observable::new(|_signal| async { Ok(42) });
    ///
    /// obs.subscribe_with(
    ///     |value| println!("Next: {}", value),
    ///     |err| eprintln!("Error: {}", err),
    ///     || println!("Complete!"),
    /// );
    /// # }
    /// ```
    pub fn subscribe_with<N, Er, C>(&self, next: N, error: Er, complete: C) -> Subscription
    where
        N: FnOnce(T) + Send + 'static,
        Er: FnOnce(E) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.subscribe(FnObserver {
            next: Some(next),
            error: Some(error),
            complete: Some(complete),
        })
    }

    /// Subscribe with only next callback (simplified)
    pub fn subscribe_next<F>(&self, next: F) -> Subscription
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.subscribe_with(next, |_| {}, || {})
    }

    /// Map operator - transform the emitted value
    pub fn map<U, F>(self, f: F) -> Observable<U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let producer = self.producer;
        Observable::new(move |signal| {
            let f = Arc::clone(&f);
            let request = producer(signal);
            async move { request.await.map(|value| f(value)) }
        })
    }

    /// Map the error notification
    pub fn map_err<E2, F>(self, f: F) -> Observable<T, E2>
    where
        E2: Send + 'static,
        F: Fn(E) -> E2 + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let producer = self.producer;
        Observable::new(move |signal| {
            let f = Arc::clone(&f);
            let request = producer(signal);
            async move { request.await.map_err(|error| f(error)) }
        })
    }

    /// Convert to a Stream yielding at most one item
    ///
    /// Dropping the stream before it yields aborts the request.
    pub fn into_stream(self) -> Pin<Box<dyn Stream<Item = Result<T, E>> + Send + 'static>> {
        let settle = self.into_future();
        Box::pin(async_stream::stream! {
            yield settle.await;
        })
    }
}

/// Future returned by awaiting an [`Observable`]
///
/// Resolves with the single outcome. Dropped before that, it aborts the
/// request signal.
pub struct Settle<T, E> {
    request: BoxFuture<'static, Result<T, E>>,
    controller: AbortController,
    settled: bool,
}

impl<T, E> Future for Settle<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.request.as_mut().poll(cx) {
            Poll::Ready(outcome) => {
                self.settled = true;
                Poll::Ready(outcome)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> Drop for Settle<T, E> {
    fn drop(&mut self) {
        if !self.settled && self.controller.abort() {
            tracing::debug!("observable future dropped before settlement, request aborted");
        }
    }
}

impl<T: Send + 'static, E: Send + 'static> IntoFuture for Observable<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = Settle<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        let controller = AbortController::new();
        let request = (self.producer)(controller.signal());
        Settle {
            request,
            controller,
            settled: false,
        }
    }
}

/// Bridge a single-shot request into an [`Observable`]
///
/// `make_request` receives a fresh [`AbortSignal`] per subscription and should
/// stop its work once the signal is aborted. Outcomes are passed through
/// unmodified.
pub fn observify<T, E, F, Fut>(make_request: F) -> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(AbortSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Observable::new(make_request)
}
