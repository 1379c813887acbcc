pub mod invariants;

pub use invariants::{live_descendants, validate_translation};
