//! Middleware trait and chain plumbing
//!
//! A host service mounts Vigil's health endpoint as one middleware in a
//! chain: the health reporter answers requests for its own path and hands
//! everything else to the next element via [`Next`].

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::fmt;
use std::sync::Arc;

/// Body type alias
pub type Body = Full<Bytes>;

/// Middleware trait for request/response processing
#[async_trait]
pub trait Middleware: Send + Sync + fmt::Debug {
    /// Process a request, either producing a response or delegating to
    /// the rest of the chain via `next.run(req)`.
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>>;
}

/// Boxed terminal handler invoked when the chain is exhausted
pub type Handler = Box<
    dyn Fn(
            Request<Body>,
        )
            -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response<Body>>> + Send>>
        + Send
        + Sync,
>;

/// Cursor over the remaining middleware chain
pub struct Next {
    chain: Arc<[Arc<dyn Middleware>]>,
    index: usize,
    handler: Option<Arc<Handler>>,
}

impl Next {
    /// Create a cursor over a middleware chain with no terminal handler
    pub fn new(chain: Arc<[Arc<dyn Middleware>]>) -> Self {
        Self {
            chain,
            index: 0,
            handler: None,
        }
    }

    /// Create a cursor with a terminal handler that runs after the chain
    pub fn with_handler(chain: Arc<[Arc<dyn Middleware>]>, handler: Handler) -> Self {
        Self {
            chain,
            index: 0,
            handler: Some(Arc::new(handler)),
        }
    }

    /// Invoke the next middleware, or the terminal handler once the chain
    /// is exhausted
    pub async fn run(self, req: Request<Body>) -> Result<Response<Body>> {
        if let Some(middleware) = self.chain.get(self.index) {
            let next = Self {
                chain: Arc::clone(&self.chain),
                index: self.index + 1,
                handler: self.handler.clone(),
            };
            middleware.call(req, next).await
        } else if let Some(handler) = self.handler {
            handler(req).await
        } else {
            Err(Error::Internal(
                "Middleware chain completed without handler".to_string(),
            ))
        }
    }
}

impl Clone for Next {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            index: self.index,
            handler: self.handler.clone(),
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &(self.chain.len() - self.index))
            .finish()
    }
}
