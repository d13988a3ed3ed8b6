use crate::coerce::Coerce;
use crate::error::{ConfigError, ConfigErrors};
use crate::field::{Field, Source};
use crate::schema::{FieldDecl, Schema};
use crate::source::EnvSource;
use crate::value::Value;
use std::ops::Index;

/// Resolves a single field: environment first, then the default, then the
/// type's absent value.
///
/// Coercion failures are returned as-is and are never reported as missing.
pub fn resolve_field<T: Coerce>(
    env: &dyn EnvSource,
    schema: &Schema,
    decl: &FieldDecl,
    default: Option<T>,
) -> Result<Field<T>, ConfigError> {
    let raw = env
        .var(decl.name)
        .map_err(|e| e.with_description(decl.description))?;

    if let Some(raw) = raw {
        return match T::coerce(&raw) {
            Ok(value) => Ok(Field::new(decl.name, value, Source::Environment)),
            Err(source) => Err(ConfigError::TypeCoercion {
                key: decl.name.to_string(),
                value: raw,
                description: decl.description.to_string(),
                source,
            }),
        };
    }

    if let Some(value) = default {
        return Ok(Field::new(decl.name, value, Source::Default));
    }

    match T::absent() {
        Some(value) => Ok(Field::new(decl.name, value, Source::Absent)),
        None => Err(ConfigError::MissingRequiredField {
            key: decl.name.to_string(),
            schema: schema.name.to_string(),
            description: decl.description.to_string(),
        }),
    }
}

/// Resolves the fields of one schema, collecting errors instead of stopping
/// at the first one
///
/// Used by the code generated by `define_settings!`:
///
/// ```rust
/// use enver::{FieldDecl, MapEnv, Resolver, Schema};
///
/// static FIELDS: [FieldDecl; 1] = [FieldDecl {
///     name: "PORT",
///     ident: "port",
///     kind: "integer",
///     description: "Server port",
///     default: Some("8080"),
///     required: false,
/// }];
/// static SCHEMA: Schema = Schema { name: "Server", fields: &FIELDS };
///
/// let env = MapEnv::new();
/// let mut resolver = Resolver::new(&SCHEMA, &env);
/// let port = resolver.field::<u16>(0, Some(8080));
/// let values = resolver.finish().unwrap();
///
/// assert_eq!(port.map(|p| p.value), Some(8080));
/// assert_eq!(values["port"], 8080i64);
/// ```
pub struct Resolver<'a> {
    schema: &'static Schema,
    env: &'a dyn EnvSource,
    entries: Vec<Entry>,
    errors: Vec<ConfigError>,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'static Schema, env: &'a dyn EnvSource) -> Self {
        Self {
            schema,
            env,
            entries: Vec::with_capacity(schema.len()),
            errors: Vec::new(),
        }
    }

    /// Resolve the field declared at `index`, recording an error on failure
    ///
    /// Fields must be resolved in declaration order.
    pub fn field<T: Coerce>(&mut self, index: usize, default: Option<T>) -> Option<Field<T>> {
        let decl = &self.schema.fields[index];

        match resolve_field(self.env, self.schema, decl, default) {
            Ok(field) => {
                tracing::debug!(
                    schema = self.schema.name,
                    field = decl.name,
                    source = %field.source,
                    "resolved settings field"
                );
                self.entries.push(Entry {
                    name: decl.name,
                    value: field.value.to_value(),
                    source: field.source,
                });
                Some(field)
            }
            Err(e) => {
                tracing::debug!(
                    schema = self.schema.name,
                    field = decl.name,
                    missing = e.is_missing(),
                    "failed to resolve settings field"
                );
                self.errors.push(e);
                None
            }
        }
    }

    /// Finish resolution, returning the canonical mapping or every error
    pub fn finish(self) -> Result<Resolved, ConfigErrors> {
        match ConfigErrors::from_vec(self.errors) {
            Some(errors) => Err(errors),
            None => Ok(Resolved {
                schema: self.schema,
                entries: self.entries,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: &'static str,
    value: Value,
    source: Source,
}

/// The canonical name -> value mapping of a resolved settings instance,
/// in declaration order
///
/// All name-based access is case-insensitive and fails with
/// [`ConfigError::UnknownField`] for names outside the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    schema: &'static Schema,
    entries: Vec<Entry>,
}

impl Resolved {
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    fn entry(&self, name: &str) -> Result<&Entry, ConfigError> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::unknown(name, self.schema.name))
    }

    pub fn get(&self, name: &str) -> Result<&Value, ConfigError> {
        self.entry(name).map(|e| &e.value)
    }

    pub fn source(&self, name: &str) -> Result<Source, ConfigError> {
        self.entry(name).map(|e| e.source)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|e| (e.name, &e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Panics with the [`ConfigError::UnknownField`] message for undeclared
/// names, like `HashMap` indexing. Use [`Resolved::get`] to handle it.
impl Index<&str> for Resolved {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.get(name) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<'a> IntoIterator for &'a Resolved {
    type Item = (&'static str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Resolved {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
