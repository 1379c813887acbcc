//! Structured logging facility
//!
//! - One initialization point, `init(profile)`
//! - Lifecycle macros `log_op_start!`, `log_op_end!` and `log_op_error!`,
//!   emitted only by the command boundary
//! - Test capture mode for asserting on emitted events
//!
//! ```rust
//! use pagenode_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
