//! Common-header injection.
//!
//! A decorator is handed a mutable header map for the duration of one call
//! and fills in cross-cutting defaults (auth token, user agent, device id).
//! It is shared between clients and in-flight requests behind an `Arc`, so
//! implementations must be `Send + Sync` and keep any state of their own
//! consistent.

use crate::types::RequestHeader;

/// Fills default headers into an outgoing request.
pub trait HeaderDecorator: Send + Sync {
    fn fill_header(&self, header: &mut RequestHeader);
}

impl<F> HeaderDecorator for F
where
    F: Fn(&mut RequestHeader) + Send + Sync,
{
    fn fill_header(&self, header: &mut RequestHeader) {
        self(header)
    }
}

/// A fixed header set decorates by copying its entries.
impl HeaderDecorator for RequestHeader {
    fn fill_header(&self, header: &mut RequestHeader) {
        header.merge(self);
    }
}
