use crate::types::WireType;

///
/// ColumnModel
/// One physical column and the wire type it binds with.
///

#[derive(Debug)]
pub struct ColumnModel {
    pub name: &'static str,
    pub wire: WireType,
}

///
/// IdentifierModel
///
/// Primary-key mapping for one entity.
/// Composite identifiers list their columns in binding order; the matching
/// domain value is a `Value::List` with one part per column.
///

#[derive(Debug)]
pub struct IdentifierModel {
    /// Identifier attribute name as used in paths and predicates.
    pub name: &'static str,
    /// Ordered column list (authoritative for disassembly order).
    pub columns: &'static [ColumnModel],
}

impl IdentifierModel {
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.columns.len()
    }
}

///
/// AttributeModel
/// Single-column basic attribute.
///

#[derive(Debug)]
pub struct AttributeModel {
    pub name: &'static str,
    pub wire: WireType,
    /// Declared unique; eligible as a referenced property for to-one keys.
    pub unique: bool,
}
