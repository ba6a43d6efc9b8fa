//! # Interceptor execution chain
//!
//! Wraps a resolved handler with an ordered list of interceptors. Pre-handle runs in
//! registration order and can stop the chain; post-handle and completion callbacks run
//! in reverse order, with completion bounded to the interceptors that actually entered
//! the request.

use std::fmt;
use std::sync::Arc;

use dispatch_core::{
    DispatchError, HandlerInterceptor, HandlerResult, Request, RequestHandler, Response, Result,
};
use tracing::{debug, error, info, instrument};

/// Execution chain for one request: the handler plus the interceptors wrapped around it.
///
/// A chain instance is scoped to a single request execution. The pre-handle pass takes
/// `&mut self` to record how far it got, so an instance cannot be shared across
/// concurrent requests; the dispatch loop creates a fresh chain per request.
pub struct HandlerExecutionChain {
    handler: Arc<dyn RequestHandler>,
    interceptors: Vec<Arc<dyn HandlerInterceptor>>,
    /// Index of the last interceptor whose `pre_handle` returned `Ok(true)`; `None`
    /// until one does. Bounds the completion pass.
    interceptor_index: Option<usize>,
}

impl HandlerExecutionChain {
    /// Wraps a plain handler with no interceptors.
    pub fn new(handler: Arc<dyn RequestHandler>) -> Self {
        Self::with_interceptors(handler, Vec::new())
    }

    /// Wraps a plain handler with the given interceptors, applied in the given order
    /// before the handler itself executes.
    pub fn with_interceptors(
        handler: Arc<dyn RequestHandler>,
        interceptors: Vec<Arc<dyn HandlerInterceptor>>,
    ) -> Self {
        Self {
            handler,
            interceptors,
            interceptor_index: None,
        }
    }

    /// Extends an existing chain with additional interceptors.
    ///
    /// The new chain takes the inner chain's handler (chains never nest) and its
    /// interceptor order is the inner chain's interceptors followed by the new ones,
    /// so execution order is always oldest contributor first.
    pub fn extend(
        chain: HandlerExecutionChain,
        interceptors: Vec<Arc<dyn HandlerInterceptor>>,
    ) -> Self {
        let mut merged = chain.interceptors;
        merged.extend(interceptors);
        Self {
            handler: chain.handler,
            interceptors: merged,
            interceptor_index: None,
        }
    }

    /// Appends an interceptor at the end of the chain.
    pub fn add_interceptor(&mut self, interceptor: Arc<dyn HandlerInterceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Appends interceptors at the end of the chain, keeping their order.
    pub fn add_interceptors(&mut self, interceptors: Vec<Arc<dyn HandlerInterceptor>>) {
        self.interceptors.extend(interceptors);
    }

    /// The handler this chain wraps. The chain never invokes it; the dispatch loop does.
    pub fn handler(&self) -> &Arc<dyn RequestHandler> {
        &self.handler
    }

    /// The interceptors to apply, in application order.
    pub fn interceptors(&self) -> &[Arc<dyn HandlerInterceptor>] {
        &self.interceptors
    }

    /// Applies `pre_handle` on every interceptor, in order.
    ///
    /// Returns `Ok(true)` if the dispatch loop should proceed with the handler.
    /// `Ok(false)` means an interceptor has dealt with the response itself: the
    /// interceptors that already entered are unwound via
    /// [`trigger_after_completion`](Self::trigger_after_completion) and the handler
    /// must not run. An `Err` from an interceptor propagates as-is, leaving the
    /// watermark at the last success; the caller's error path is responsible for
    /// triggering completion with that error.
    #[instrument(skip(self, request, response), fields(request_id = %request.id))]
    pub async fn apply_pre_handle(
        &mut self,
        request: &Request,
        response: &mut Response,
    ) -> Result<bool> {
        for (i, interceptor) in self.interceptors.iter().enumerate() {
            debug!(interceptor = %interceptor.name(), "step: pre_handle");
            if !interceptor
                .pre_handle(request, response, self.handler.as_ref())
                .await?
            {
                info!(
                    interceptor = %interceptor.name(),
                    "step: pre_handle declined, chain stopped"
                );
                self.trigger_after_completion(request, response, None).await;
                return Ok(false);
            }
            self.interceptor_index = Some(i);
        }
        Ok(true)
    }

    /// Applies `post_handle` on every interceptor, in reverse order.
    ///
    /// Only meaningful after [`apply_pre_handle`](Self::apply_pre_handle) returned
    /// `Ok(true)` and the handler succeeded, so no watermark check is needed. An `Err`
    /// from an interceptor propagates; the caller's completion logic owns recovery.
    #[instrument(skip(self, request, response, result), fields(request_id = %request.id))]
    pub async fn apply_post_handle(
        &self,
        request: &Request,
        response: &mut Response,
        result: Option<&HandlerResult>,
    ) -> Result<()> {
        for interceptor in self.interceptors.iter().rev() {
            debug!(interceptor = %interceptor.name(), "step: post_handle");
            interceptor
                .post_handle(request, response, self.handler.as_ref(), result)
                .await?;
        }
        Ok(())
    }

    /// Triggers `after_completion` on the interceptors whose `pre_handle` returned
    /// `Ok(true)`, in reverse order, with the error that ended the request (or `None`).
    ///
    /// Each callback is isolated: an `Err` is logged and swallowed so one misbehaving
    /// interceptor cannot starve the others. Never fails; a no-op when no interceptor
    /// ever entered.
    #[instrument(skip(self, request, response, error), fields(request_id = %request.id))]
    pub async fn trigger_after_completion(
        &self,
        request: &Request,
        response: &mut Response,
        error: Option<&DispatchError>,
    ) {
        let Some(last) = self.interceptor_index else {
            return;
        };
        for interceptor in self.interceptors[..=last].iter().rev() {
            debug!(interceptor = %interceptor.name(), "step: after_completion");
            if let Err(err) = interceptor
                .after_completion(request, response, self.handler.as_ref(), error)
                .await
            {
                error!(
                    interceptor = %interceptor.name(),
                    error = %err,
                    "after_completion threw"
                );
            }
        }
    }

    /// Notifies interceptors that the handler started concurrent processing, in
    /// reverse order. Only interceptors advertising the concurrent-handling capability
    /// are called; errors are logged and swallowed per interceptor. Never fails.
    #[instrument(skip(self, request, response), fields(request_id = %request.id))]
    pub async fn apply_after_concurrent_handling_started(
        &self,
        request: &Request,
        response: &mut Response,
    ) {
        for interceptor in self.interceptors.iter().rev() {
            if !interceptor.supports_concurrent_handling() {
                continue;
            }
            debug!(interceptor = %interceptor.name(), "step: after_concurrent_handling_started");
            if let Err(err) = interceptor
                .after_concurrent_handling_started(request, response, self.handler.as_ref())
                .await
            {
                error!(
                    interceptor = %interceptor.name(),
                    error = %err,
                    "after_concurrent_handling_started failed"
                );
            }
        }
    }
}

impl fmt::Display for HandlerExecutionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HandlerExecutionChain with handler [{}]",
            self.handler.name()
        )?;
        if !self.interceptors.is_empty() {
            write!(f, " and {} interceptor", self.interceptors.len())?;
            if self.interceptors.len() > 1 {
                write!(f, "s")?;
            }
        }
        Ok(())
    }
}

// Integration tests live in tests/execution_chain_test.rs
