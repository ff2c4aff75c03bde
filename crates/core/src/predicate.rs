//! Relational predicate fragment emitted by nearest-neighbor lookups
//!
//! The bridge never executes relational queries itself; it hands the
//! query compiler an `<column> IN (<ordered literal list>)` fragment and
//! lets that layer splice it into a WHERE clause. The literal order is
//! the nearest-first search ranking, but the relational layer is free to
//! impose its own result ordering; preserving rank end-to-end is a
//! caller concern.

use std::fmt;

use crate::entity::EntityId;

/// An ordered `identifier IN (…)` predicate fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPredicate {
    column: String,
    ids: Vec<EntityId>,
}

impl IdPredicate {
    /// Build a predicate over the given identifier column
    pub fn new(column: impl Into<String>, ids: Vec<EntityId>) -> Self {
        IdPredicate {
            column: column.into(),
            ids,
        }
    }

    /// Identifier column name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Matched identifiers, nearest first
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Whether the search matched nothing
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Render the fragment as SQL
    ///
    /// Integer ids render bare, UUIDs single-quoted. An empty match
    /// renders `IN (NULL)`, which selects no rows, because a bare `IN ()`
    /// is not valid SQL.
    pub fn to_sql(&self) -> String {
        if self.ids.is_empty() {
            return format!("{} IN (NULL)", self.column);
        }
        let literals: Vec<String> = self
            .ids
            .iter()
            .map(|id| match id {
                EntityId::Int(v) => v.to_string(),
                EntityId::Uuid(u) => format!("'{u}'"),
            })
            .collect();
        format!("{} IN ({})", self.column, literals.join(", "))
    }
}

impl fmt::Display for IdPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}
