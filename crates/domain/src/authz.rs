//! Resolved authorization context.
//!
//! Identity and claims parsing live in the transport shell; the core only
//! ever sees an [`Authorization`] value carrying the already-resolved set of
//! granted permissions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One operation-level authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    CreateSalesOrder,
    ReadSalesOrder,
    UpdateSalesOrder,
    DeleteSalesOrder,
    ConfirmSalesOrder,
    CreateInvoice,
    ReadInvoice,
    UpdateInvoice,
    DeleteInvoice,
}

impl Permission {
    /// All defined permissions.
    pub const ALL: [Permission; 9] = [
        Permission::CreateSalesOrder,
        Permission::ReadSalesOrder,
        Permission::UpdateSalesOrder,
        Permission::DeleteSalesOrder,
        Permission::ConfirmSalesOrder,
        Permission::CreateInvoice,
        Permission::ReadInvoice,
        Permission::UpdateInvoice,
        Permission::DeleteInvoice,
    ];

    /// Authority name as carried in token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateSalesOrder => "CREATE_SALES_ORDER",
            Permission::ReadSalesOrder => "READ_SALES_ORDER",
            Permission::UpdateSalesOrder => "UPDATE_SALES_ORDER",
            Permission::DeleteSalesOrder => "DELETE_SALES_ORDER",
            Permission::ConfirmSalesOrder => "CONFIRM_SALES_ORDER",
            Permission::CreateInvoice => "CREATE_INVOICE",
            Permission::ReadInvoice => "READ_INVOICE",
            Permission::UpdateInvoice => "UPDATE_INVOICE",
            Permission::DeleteInvoice => "DELETE_INVOICE",
        }
    }

    /// Parses an authority name.
    pub fn parse(name: &str) -> Option<Permission> {
        Permission::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The set of permissions granted to the caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Authorization {
    granted: HashSet<Permission>,
}

impl Authorization {
    /// Grants every permission.
    pub fn all() -> Self {
        Self::granting(Permission::ALL)
    }

    /// Grants nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Grants exactly the given permissions.
    pub fn granting(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: permissions.into_iter().collect(),
        }
    }

    /// Returns true if the permission is granted.
    pub fn permits(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }

    /// Fails with [`DomainError::Forbidden`] unless the permission is granted.
    pub fn require(&self, permission: Permission) -> Result<(), DomainError> {
        if self.permits(permission) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!(
                "Access denied: missing authority {permission}"
            )))
        }
    }
}
