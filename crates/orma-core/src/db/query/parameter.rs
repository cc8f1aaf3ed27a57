use crate::{
    error::InternalError,
    model::DomainModel,
    types::{ValueClass, ValueMapping},
};
use std::fmt;

///
/// QueryParameterId
/// Arena identity of one logical parameter within a statement.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryParameterId(pub(crate) u32);

impl fmt::Display for QueryParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qp{}", self.0)
    }
}

///
/// OccurrenceId
/// Arena identity of one syntactic occurrence (or expansion) of a parameter.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OccurrenceId(pub(crate) u32);

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "occ{}", self.0)
    }
}

///
/// ParameterName
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParameterName {
    Named(String),
    /// 1-based ordinal label.
    Positional(u32),
}

impl ParameterName {
    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, ":{name}"),
            Self::Positional(position) => write!(f, "?{position}"),
        }
    }
}

///
/// ParameterSpec
/// Declaration of a logical parameter before it is registered.
///

#[derive(Clone, Debug)]
pub struct ParameterSpec {
    pub name: ParameterName,
    pub declared_type: Option<ValueMapping>,
    pub value_class: Option<ValueClass>,
    pub allows_multi_valued: bool,
}

impl ParameterSpec {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(ParameterName::Named(name.into()))
    }

    #[must_use]
    pub const fn positional(position: u32) -> Self {
        Self::new(ParameterName::Positional(position))
    }

    const fn new(name: ParameterName) -> Self {
        Self {
            name,
            declared_type: None,
            value_class: None,
            allows_multi_valued: false,
        }
    }

    #[must_use]
    pub const fn with_declared_type(mut self, mapping: ValueMapping) -> Self {
        self.declared_type = Some(mapping);
        self
    }

    #[must_use]
    pub const fn with_value_class(mut self, class: ValueClass) -> Self {
        self.value_class = Some(class);
        self
    }

    #[must_use]
    pub const fn multi_valued(mut self) -> Self {
        self.allows_multi_valued = true;
        self
    }
}

///
/// QueryParameter
/// A registered logical parameter.
///

#[derive(Clone, Debug)]
pub struct QueryParameter {
    pub id: QueryParameterId,
    pub name: ParameterName,
    pub declared_type: Option<ValueMapping>,
    pub value_class: Option<ValueClass>,
    pub allows_multi_valued: bool,
}

impl fmt::Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

///
/// AnticipatedType
///
/// Structural expectation at an occurrence, taken from the expression the
/// parameter is compared against.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnticipatedType {
    Mapping(ValueMapping),
    Attribute {
        entity: &'static str,
        attribute: &'static str,
    },
}

impl AnticipatedType {
    pub fn resolve(&self, domain_model: &DomainModel) -> Result<ValueMapping, InternalError> {
        match self {
            Self::Mapping(mapping) => Ok(*mapping),
            Self::Attribute { entity, attribute } => {
                domain_model.resolve_attribute_mapping(entity, attribute)
            }
        }
    }
}

///
/// ParameterOccurrence
///
/// One place a parameter appears in a statement. Expansions created for
/// multi-valued bindings point back at their original occurrence.
///

#[derive(Clone, Debug)]
pub struct ParameterOccurrence {
    pub id: OccurrenceId,
    pub parameter: QueryParameterId,
    pub anticipated: Option<AnticipatedType>,
    pub expansion_of: Option<OccurrenceId>,
}

impl ParameterOccurrence {
    #[must_use]
    pub const fn is_expansion(&self) -> bool {
        self.expansion_of.is_some()
    }
}
