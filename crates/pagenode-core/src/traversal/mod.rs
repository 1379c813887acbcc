pub mod ancestry;

pub use ancestry::{ancestors, parents_have_translation};
