//! Collaborator error mapping into the domain taxonomy.

use directory::DirectoryError;
use domain::DomainError;
use store::StoreError;

/// Maps a store failure onto the domain taxonomy.
///
/// Version conflicts and duplicate invoices are business-visible conflicts;
/// everything else is an opaque storage fault.
pub(crate) fn store_error(error: StoreError) -> DomainError {
    match error {
        StoreError::ConcurrencyConflict { .. } | StoreError::DuplicateInvoice(_) => {
            DomainError::conflict(error.to_string())
        }
        other => DomainError::storage(other.to_string()),
    }
}

/// Maps a directory failure onto the domain taxonomy.
///
/// Any non-success lookup outcome is a validation failure that aborts the
/// operation before local state is touched.
pub(crate) fn directory_error(error: DirectoryError) -> DomainError {
    DomainError::invalid_input(error.to_string())
}
