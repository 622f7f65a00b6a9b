//! Application callbacks invoked by the engine.
//!
//! A handler is called exactly once per connection with either the parsed
//! request or the failure that ended it. Returning `true` means the response
//! is ready now and the engine writes it; returning `false` means either no
//! response at all (typical for the error path) or a deferred one, finished
//! later through a [`ResponseHandle`](crate::connection::ResponseHandle)
//! taken from the [`DeferredResponse`] argument.

use async_trait::async_trait;

use crate::connection::DeferredResponse;
use crate::protocol::{HttpError, Message, Response};

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handles one exchange.
    ///
    /// `request` carries the parsed message, or the error that ended the
    /// connection (resolution, handshake, parse or transport failure).
    /// In the error case the return value is ignored and nothing is written.
    async fn call(&self, request: Result<&Message, &HttpError>, response: &mut Response, deferred: &DeferredResponse)
        -> bool;
}

/// A [`Handler`] built from a plain closure.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(Result<&Message, &HttpError>, &mut Response, &DeferredResponse) -> bool + Send + Sync + 'static,
{
    async fn call(&self, request: Result<&Message, &HttpError>, response: &mut Response, deferred: &DeferredResponse)
        -> bool {
        (self.f)(request, response, deferred)
    }
}

pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Result<&Message, &HttpError>, &mut Response, &DeferredResponse) -> bool + Send + Sync + 'static,
{
    HandlerFn { f }
}
