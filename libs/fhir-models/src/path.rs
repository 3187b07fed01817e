//! Dotted/indexed structural paths (`item[0].category`)

use std::fmt;

/// Location of an element relative to the root of the graph being decoded or validated.
///
/// The root itself renders as an empty string; fields are joined with `.` and list
/// positions are appended as `[index]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementPath(String);

impl ElementPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of a named child of this element
    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Path of the `index`-th item of the list at this path
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Re-root `relative` under this path.
    pub fn join(&self, relative: &str) -> Self {
        match (self.0.is_empty(), relative.is_empty()) {
            (true, _) => Self(relative.to_string()),
            (false, true) => self.clone(),
            (false, false) if relative.starts_with('[') => Self(format!("{}{}", self.0, relative)),
            (false, false) => Self(format!("{}.{}", self.0, relative)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of segments, counting list indices as part of their field segment
    pub fn depth(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.split('.').count()
        }
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ElementPath> for String {
    fn from(path: &ElementPath) -> Self {
        path.0.clone()
    }
}
