use std::fmt;
use std::ops::Deref;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Source {
    /// An environment variable with the declared name
    Environment,
    /// The default declared in the schema
    Default,
    /// Neither was set and the field type is nullable
    Absent,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::Default => write!(f, "default"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// A resolved settings field: the typed value plus its provenance
#[derive(Debug, Clone)]
pub struct Field<T> {
    /// Declared name, also the environment variable name
    pub name: &'static str,
    pub source: Source,
    pub value: T,
}

impl<T> Field<T> {
    pub fn new(name: &'static str, value: T, source: Source) -> Self {
        Self {
            name,
            source,
            value,
        }
    }

    pub fn from_env(&self) -> bool {
        self.source == Source::Environment
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

// Allow using Field<T> as &T without writing .value
impl<T> Deref for Field<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> AsRef<T> for Field<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq> PartialEq<T> for Field<T> {
    fn eq(&self, other: &T) -> bool {
        self.value == *other
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
