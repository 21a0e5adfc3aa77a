use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int,
    String,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Int => write!(f, "int"),
            FieldKind::String => write!(f, "string"),
        }
    }
}

/// Declarative constraint for one field, addressed by a dot-separated path
/// such as `differences.to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub path: String,
    pub required: bool,
    pub kind: FieldKind,
    /// Only consulted for `FieldKind::String`. Matched against the whole value.
    pub pattern: Option<String>,
    /// A required int equal to zero normally counts as empty. Ids that
    /// legitimately start at zero opt out with this flag.
    pub allow_zero: bool,
}

impl FieldRule {
    pub fn new(path: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            path: path.into(),
            required: false,
            kind,
            pattern: None,
            allow_zero: false,
        }
    }

    pub fn int(path: impl Into<String>) -> Self {
        Self::new(path, FieldKind::Int)
    }

    pub fn string(path: impl Into<String>) -> Self {
        Self::new(path, FieldKind::String)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_if(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn matching(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn allow_zero(mut self) -> Self {
        self.allow_zero = true;
        self
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }
}
