//! Table shapes mirrored between the remote backend and the local cache.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Prefix reserved for the cache's own bookkeeping tables.
pub const SYSTEM_TABLE_PREFIX: &str = "__";

/// Column affinity in the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Boolean,
}

impl ColumnType {
    /// SQL type name used when materializing the column.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer | Self::Boolean => "INTEGER",
            Self::Real => "REAL",
        }
    }
}

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Shape of one mirrored table.
///
/// Every table is keyed by a text `id` column; it is implied and must not be
/// declared again in `columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// Name of the implied primary key column.
    pub const ID_COLUMN: &'static str = "id";

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Builder-style column declaration.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDefinition::new(name, column_type));
        self
    }

    /// Look up a declared column.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check that the table and column names are usable identifiers.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidTable`] describing the first problem found.
    pub fn validate(&self) -> Result<(), StoreError> {
        let invalid = |reason: String| StoreError::InvalidTable {
            table: self.name.clone(),
            reason,
        };

        if !is_identifier(&self.name) {
            return Err(invalid("table name must be a non-empty identifier".into()));
        }
        if self.name.starts_with(SYSTEM_TABLE_PREFIX) {
            return Err(invalid(format!(
                "table names starting with '{SYSTEM_TABLE_PREFIX}' are reserved"
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !is_identifier(&column.name) {
                return Err(invalid(format!("invalid column name '{}'", column.name)));
            }
            if column.name.eq_ignore_ascii_case(Self::ID_COLUMN) {
                return Err(invalid("the id column is implied".into()));
            }
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(invalid(format!("duplicate column '{}'", column.name)));
            }
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A record type that can be mirrored into the local cache.
pub trait Record {
    /// Table definition registered with the local store.
    fn table() -> TableDefinition;
}

/// Illustrative todo-list record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub complete: bool,
}

impl Record for TodoItem {
    fn table() -> TableDefinition {
        TableDefinition::new("TodoItem")
            .column("text", ColumnType::Text)
            .column("complete", ColumnType::Boolean)
    }
}
