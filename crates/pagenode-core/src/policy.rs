//! Authorization hook
//!
//! The command boundary asks an [`Authorizer`] before running any page
//! operation. How permissions are evaluated is up to the implementation.

use crate::errors::{PageNodeError, Result};
use crate::model::Node;

/// Permission checked against a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    View,
    Edit,
    Publish,
    Unpublish,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "VIEW",
            Permission::Edit => "EDIT",
            Permission::Publish => "PUBLISH",
            Permission::Unpublish => "UNPUBLISH",
            Permission::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Authorizer {
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the current user may not exercise
    /// `permission` on `node`.
    fn check(&self, permission: Permission, node: &Node) -> Result<()>;
}

/// Always allows (CLI default and tests that don't exercise authorization)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAuthorizer;

impl Authorizer for AllowAllAuthorizer {
    fn check(&self, _permission: Permission, _node: &Node) -> Result<()> {
        Ok(())
    }
}

/// Always denies (for tests that verify a denial stops all writes)
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllAuthorizer;

impl Authorizer for DenyAllAuthorizer {
    fn check(&self, permission: Permission, node: &Node) -> Result<()> {
        Err(PageNodeError::PermissionDenied {
            permission: permission.as_str().to_string(),
            node_id: node.id,
        })
    }
}
