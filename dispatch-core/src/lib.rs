//! # dispatch-core
//!
//! Core types and traits for the request-dispatch layer: [`Request`] and [`Response`] handles,
//! the [`RequestHandler`] and [`HandlerInterceptor`] traits, error types, and tracing
//! initialization. Transport-agnostic; used by interceptor-chain and the stock interceptors.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{DispatchError, InterceptorError, Result};
pub use logger::init_tracing;
pub use types::{HandlerInterceptor, HandlerResult, Request, RequestHandler, Response};
