//! Canonical schema constants for structured logging
//!
//! Every log line emitted through the logging macros uses these keys, so log
//! consumers can rely on them.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_USER: &str = "user";

// Entity identifiers
pub const FIELD_NODE_ID: &str = "node_id";
pub const FIELD_TRANSLATION_ID: &str = "translation_id";
pub const FIELD_VERSION_ID: &str = "version_id";
pub const FIELD_LOCALE: &str = "locale";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_entity_fields_are_distinct() {
        let fields = [
            FIELD_NODE_ID,
            FIELD_TRANSLATION_ID,
            FIELD_VERSION_ID,
            FIELD_LOCALE,
        ];
        for (i, a) in fields.iter().enumerate() {
            for b in fields.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
