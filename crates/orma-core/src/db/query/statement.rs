use crate::{db::query::xref::DomainParameterXref, error::InternalError};
use std::fmt;

///
/// StatementKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    #[must_use]
    pub const fn is_select(self) -> bool {
        matches!(self, Self::Select)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// Statement
/// Analyzed statement: its kind, root entity, and parameter cross-reference.
///

#[derive(Clone, Debug)]
pub struct Statement {
    kind: StatementKind,
    root_entity: &'static str,
    parameters: DomainParameterXref,
}

impl Statement {
    #[must_use]
    pub fn new(kind: StatementKind, root_entity: &'static str) -> Self {
        Self {
            kind,
            root_entity,
            parameters: DomainParameterXref::new(),
        }
    }

    #[must_use]
    pub fn select(root_entity: &'static str) -> Self {
        Self::new(StatementKind::Select, root_entity)
    }

    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    #[must_use]
    pub const fn root_entity(&self) -> &'static str {
        self.root_entity
    }

    #[must_use]
    pub const fn parameters(&self) -> &DomainParameterXref {
        &self.parameters
    }

    pub const fn parameters_mut(&mut self) -> &mut DomainParameterXref {
        &mut self.parameters
    }
}

/// Reject anything but a select; used by read-only execution paths.
pub fn verify_is_select_statement(statement: &Statement) -> Result<(), InternalError> {
    if statement.kind.is_select() {
        return Ok(());
    }

    Err(InternalError::query_unsupported(format!(
        "expecting a select statement, but found {} against '{}'",
        statement.kind, statement.root_entity
    )))
}

/// Reject selects; used by mutation execution paths.
pub fn verify_is_non_select_statement(statement: &Statement) -> Result<(), InternalError> {
    if !statement.kind.is_select() {
        return Ok(());
    }

    Err(InternalError::query_unsupported(format!(
        "expecting a non-select statement, but found select against '{}'",
        statement.root_entity
    )))
}
