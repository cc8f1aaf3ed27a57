use std::fmt;

///
/// NavigablePath
///
/// Dotted path from a fetch-graph root to one node, e.g. `Person.passport.owner`.
/// Identity key for initializers within a row batch.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NavigablePath {
    segments: Vec<&'static str>,
}

impl NavigablePath {
    #[must_use]
    pub fn root(entity_name: &'static str) -> Self {
        Self {
            segments: vec![entity_name],
        }
    }

    #[must_use]
    pub fn append(&self, name: &'static str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name);

        Self { segments }
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        (self.segments.len() > 1).then(|| Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    #[must_use]
    pub fn local_name(&self) -> &'static str {
        self.segments.last().copied().unwrap_or_default()
    }

    /// Number of association hops from the root.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.segments.len() < other.segments.len() && other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for NavigablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
