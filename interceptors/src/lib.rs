//! # Stock interceptors
//!
//! Ready-made [`HandlerInterceptor`](dispatch_core::HandlerInterceptor) implementations
//! for the execution chain: request logging and allowlist-based auth. Both are free of
//! per-request state and safe to share across concurrent chains.

mod interceptors;

pub use interceptors::{AuthInterceptor, LoggingInterceptor};

#[cfg(test)]
mod test;
