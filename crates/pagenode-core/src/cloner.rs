//! Payload deep-clone collaborator

use crate::errors::Result;
use crate::model::{Payload, PayloadId};

/// Produces an independent copy of a payload under a fresh id
///
/// The engine persists the returned payload in the same commit as the
/// version that references it.
pub trait Cloner {
    /// # Errors
    ///
    /// Implementations may fail when the payload cannot be copied (e.g. it
    /// references content that no longer exists).
    fn deep_clone(&self, payload: &Payload, new_id: PayloadId) -> Result<Payload>;
}

/// Copies every field, content included, and assigns `new_id`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepCloner;

impl Cloner for DeepCloner {
    fn deep_clone(&self, payload: &Payload, new_id: PayloadId) -> Result<Payload> {
        let mut copy = payload.clone();
        copy.id = new_id;
        tracing::debug!(from = payload.id.get(), to = new_id.get(), "payload cloned");
        Ok(copy)
    }
}
