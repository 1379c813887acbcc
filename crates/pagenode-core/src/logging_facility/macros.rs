//! Lifecycle logging macros
//!
//! Field keys and event names come from `pagenode_core_types::schema`,
//! re-exported as `pagenode_core::core_types` so the macros resolve from any
//! crate. Extra `key = value` fields are forwarded to `tracing` untouched.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_lifecycle {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::$event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use pagenode_core::log_op_start;
/// log_op_start!("publish");
/// log_op_start!("publish", node_id = 7u64, locale = "en");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_lifecycle!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use pagenode_core::log_op_end;
/// log_op_end!("publish", duration_ms = 3u64);
/// log_op_end!("publish", duration_ms = 3u64, node_id = 7u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_lifecycle!(info, $op, EVENT_END, duration_ms = $duration $(, $($field)*)?)
    };
}

/// Log a failed operation with its error kind and stable code
///
/// `$err` is anything convertible into `ExError`; pass a clone if the error
/// is still needed afterwards.
///
/// ```
/// # use pagenode_core::log_op_error;
/// # use pagenode_core::errors::PageNodeError;
/// let err = PageNodeError::MissingVersionId;
/// log_op_error!("revert", err.clone(), duration_ms = 1u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_lifecycle!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code()
            $(, $($field)*)?
        );
    }};
}
