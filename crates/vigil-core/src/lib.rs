//! # Vigil Core
//!
//! Core types, traits, and error handling for the Vigil health toolkit.
//!
//! This crate provides the foundational abstractions used by the health
//! engine and by host services that mount it:
//! - Middleware trait and chain plumbing
//! - Response builder
//! - Error types

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod middleware;
pub mod response;

pub use error::{Error, Result};
pub use middleware::{Body, Handler, Middleware, Next};
pub use response::ResponseBuilder;

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{Method, Request, Response, StatusCode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::middleware::{Body, Handler, Middleware, Next};
    pub use crate::response::ResponseBuilder;
}
