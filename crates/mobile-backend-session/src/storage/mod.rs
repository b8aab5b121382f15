//! Local cache store implementations.

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "memory")]
pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use mobile_backend_core::{StoreError, TableDefinition};

/// Validate `table` and append it unless a table of the same name exists.
pub(crate) fn register_table(
    tables: &mut Vec<TableDefinition>,
    table: TableDefinition,
) -> Result<(), StoreError> {
    table.validate()?;
    if tables
        .iter()
        .any(|t| t.name.eq_ignore_ascii_case(&table.name))
    {
        return Err(StoreError::DuplicateTable(table.name));
    }
    tables.push(table);
    Ok(())
}
