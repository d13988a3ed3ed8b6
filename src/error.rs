use colored::Colorize;
use std::fmt;

/// Failure to turn a raw environment string into a field's declared type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}: {reason}")]
pub struct CoercionError {
    /// Type kind the value was coerced to, e.g. `integer`
    pub expected: &'static str,
    /// Why the parser rejected the value
    pub reason: String,
}

impl CoercionError {
    pub fn new(expected: &'static str, reason: impl ToString) -> Self {
        Self {
            expected,
            reason: reason.to_string(),
        }
    }
}

/// Errors that can occur while constructing or reading settings
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field has no default and the environment variable is not set
    MissingRequiredField {
        key: String,
        schema: String,
        description: String,
    },
    /// An environment variable is set but cannot be coerced to the field's type
    TypeCoercion {
        key: String,
        value: String,
        description: String,
        source: CoercionError,
    },
    /// A lookup named something that is not declared in the schema
    UnknownField { name: String, schema: String },
}

impl ConfigError {
    pub(crate) fn unknown(name: &str, schema: &str) -> Self {
        ConfigError::UnknownField {
            name: name.to_string(),
            schema: schema.to_string(),
        }
    }

    /// Fill in the field description if the error was raised without one
    pub(crate) fn with_description(mut self, text: &str) -> Self {
        match &mut self {
            ConfigError::MissingRequiredField { description, .. }
            | ConfigError::TypeCoercion { description, .. }
                if description.is_empty() =>
            {
                *description = text.to_string();
            }
            _ => {}
        }
        self
    }

    /// The field or lookup key this error is about
    pub fn key(&self) -> &str {
        match self {
            ConfigError::MissingRequiredField { key, .. } => key,
            ConfigError::TypeCoercion { key, .. } => key,
            ConfigError::UnknownField { name, .. } => name,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::MissingRequiredField { .. })
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequiredField {
                key,
                schema,
                description,
            } => {
                writeln!(
                    f,
                    "{}: Mandatory field of {} has no default and was not found in the environment",
                    key.magenta().bold(),
                    schema
                )?;
                if !description.is_empty() {
                    writeln!(f, "\tDescription: {}", description)?;
                }
                write!(
                    f,
                    "\tFix: set the environment variable {} or declare a default",
                    key.cyan()
                )
            }
            ConfigError::TypeCoercion {
                key,
                value,
                description,
                source,
            } => {
                writeln!(
                    f,
                    "{}: Invalid value {}",
                    key.magenta().bold(),
                    format!("'{}'", value).red(),
                )?;
                if !description.is_empty() {
                    writeln!(f, "\tDescription: {}", description)?;
                }
                write!(f, "\tReason: {}", source)
            }
            ConfigError::UnknownField { name, schema } => {
                write!(f, "{}: Not a field of {}", name.magenta().bold(), schema)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::TypeCoercion { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Every error collected while resolving one schema, in declaration order
///
/// Never empty: the first error is what [`Settings::instance`](crate::Settings::instance)
/// reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigErrors {
    first: ConfigError,
    rest: Vec<ConfigError>,
}

impl ConfigErrors {
    pub(crate) fn from_vec(errors: Vec<ConfigError>) -> Option<Self> {
        let mut iter = errors.into_iter();
        let first = iter.next()?;
        Some(Self {
            first,
            rest: iter.collect(),
        })
    }

    pub fn first(&self) -> &ConfigError {
        &self.first
    }

    pub fn into_first(self) -> ConfigError {
        self.first
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }
}

impl IntoIterator for ConfigErrors {
    type Item = ConfigError;
    type IntoIter = std::iter::Chain<std::iter::Once<ConfigError>, std::vec::IntoIter<ConfigError>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.first).chain(self.rest)
    }
}

impl From<ConfigErrors> for ConfigError {
    fn from(errors: ConfigErrors) -> Self {
        errors.into_first()
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Configuration failed with {} error(s):",
            self.len().to_string().yellow().bold()
        )?;
        for error in self.iter() {
            let indented = error.to_string().replace('\n', "\n    ");
            write!(f, "\n  - {}", indented)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}
