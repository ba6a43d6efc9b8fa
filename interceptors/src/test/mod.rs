//! Unit test module
//!
//! Stock interceptor unit tests live here, separate from source files.
//! Tests interact with interceptors via public APIs.
