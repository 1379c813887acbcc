//! Core types shared across pagenode facilities
//!
//! This crate holds the small set of types that both the error facility and
//! the logging facility need:
//!
//! - **Correlation types**: RequestId, TraceId, SpanId, RequestContext
//! - **Schema constants**: canonical log field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, SpanId, TraceId};
