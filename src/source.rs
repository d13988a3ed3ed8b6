use crate::error::{CoercionError, ConfigError};
use std::collections::HashMap;
use std::env::{self, VarError};

/// Where raw variable values are read from during resolution
///
/// Lookups use the declared name verbatim; implementations must not
/// normalise case.
pub trait EnvSource {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(raw)) => Err(ConfigError::TypeCoercion {
                key: key.to_string(),
                value: raw.to_string_lossy().into_owned(),
                description: String::new(),
                source: CoercionError::new("string", "value is not valid unicode"),
            }),
        }
    }
}

/// An in-memory environment, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.vars.get(key).cloned())
    }
}
