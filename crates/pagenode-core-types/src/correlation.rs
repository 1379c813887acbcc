//! Correlation types for request tracking
//!
//! Every node-admin request gets a `RequestContext`; its ids are attached to
//! log lines and structured errors so one request can be followed end to end.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh, time-ordered id (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an id received from elsewhere (header, log line, ...)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifier for a single admin request
    RequestId
);

correlation_id!(
    /// Trace identifier propagated from an upstream caller
    TraceId
);

correlation_id!(
    /// Span identifier within a trace
    SpanId
);

/// Request-scoped context: who is acting, and under which correlation ids
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
    /// Acting user, recorded as the owner of versions created by the request
    pub user: String,
}

impl RequestContext {
    /// Create a context for `user` with a fresh RequestId
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
            user: user.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("system")
    }
}
