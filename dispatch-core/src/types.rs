//! Core types: request and response handles, handler result, and the handler/interceptor traits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// An incoming request. The chain treats it as an opaque handle and only threads it
/// through to interceptors and the handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub received_at: DateTime<Utc>,
}

impl Request {
    pub fn new(id: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            received_at: Utc::now(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The response under construction. Interceptors and the handler may write it at any
/// point of the pipeline, so it travels as `&mut` through every callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: None,
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// What the handler produced, handed to each interceptor's `post_handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    /// A render target still to be processed by the view layer.
    View(String),
    /// The handler wrote the response itself; nothing left to render.
    Completed,
}

/// The unit of business logic the chain wraps. The chain holds the handler but never
/// invokes it; invocation belongs to the dispatch loop.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: &Request, response: &mut Response)
        -> Result<Option<HandlerResult>>;

    /// Name used in log fields and chain descriptions.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Cross-cutting interceptor wrapped around a handler execution.
///
/// The chain runs `pre_handle` in registration order, `post_handle` and
/// `after_completion` in reverse order. `pre_handle` and `post_handle` errors propagate
/// to the dispatch loop; `after_completion` and `after_concurrent_handling_started`
/// errors are contained and logged by the chain.
///
/// Interceptors are shared (`Arc`) across many concurrent chains and must keep no
/// per-request state of their own.
#[async_trait]
pub trait HandlerInterceptor: Send + Sync {
    /// Runs before the handler. Return `Ok(false)` to stop the chain: the interceptor
    /// has fully handled the response itself and the handler must not run.
    async fn pre_handle(
        &self,
        _request: &Request,
        _response: &mut Response,
        _handler: &dyn RequestHandler,
    ) -> Result<bool> {
        Ok(true)
    }

    /// Runs after a successful handler execution, before rendering, in reverse order.
    async fn post_handle(
        &self,
        _request: &Request,
        _response: &mut Response,
        _handler: &dyn RequestHandler,
        _result: Option<&HandlerResult>,
    ) -> Result<()> {
        Ok(())
    }

    /// Runs once request processing is over, in reverse order, with the error that
    /// ended the request (or `None` on normal completion). Only invoked for
    /// interceptors whose `pre_handle` returned `Ok(true)`.
    async fn after_completion(
        &self,
        _request: &Request,
        _response: &mut Response,
        _handler: &dyn RequestHandler,
        _error: Option<&DispatchError>,
    ) -> Result<()> {
        Ok(())
    }

    /// Whether this interceptor wants to be told when the handler goes concurrent.
    /// Interceptors that return true here get [`after_concurrent_handling_started`]
    /// instead of `post_handle`/`after_completion` on the async path.
    ///
    /// [`after_concurrent_handling_started`]: HandlerInterceptor::after_concurrent_handling_started
    fn supports_concurrent_handling(&self) -> bool {
        false
    }

    /// Notification that the handler started concurrent processing and the pipeline is
    /// releasing the current task. Only called when
    /// [`supports_concurrent_handling`](HandlerInterceptor::supports_concurrent_handling)
    /// is true.
    async fn after_concurrent_handling_started(
        &self,
        _request: &Request,
        _response: &mut Response,
        _handler: &dyn RequestHandler,
    ) -> Result<()> {
        Ok(())
    }

    /// Name used in log fields.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
