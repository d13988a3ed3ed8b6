use crate::error::{ConfigError, ConfigErrors};
use crate::field::Source;
use crate::registry::Registry;
use crate::resolver::Resolved;
use crate::schema::Schema;
use crate::source::{EnvSource, ProcessEnv};
use crate::value::Value;

/// A settings type declared with [`define_settings!`](crate::define_settings)
///
/// Only `schema`, `resolve_from` and `values` are generated; everything else
/// is provided.
pub trait Settings: Sized + Send + Sync + 'static {
    /// The declared fields, in declaration order
    fn schema() -> &'static Schema;

    /// Resolve a fresh, uncached instance from `env`, collecting every error
    fn resolve_from(env: &dyn EnvSource) -> Result<Self, ConfigErrors>;

    /// The canonical name -> value mapping behind `get`, `all` and indexing
    fn values(&self) -> &Resolved;

    /// The process-wide instance, resolved from the process environment on
    /// first use.
    ///
    /// Fails with the first error in declaration order; nothing is cached on
    /// failure, so the call can be retried after fixing the environment.
    fn instance() -> Result<&'static Self, ConfigError> {
        Self::instance_in(Registry::global(), &ProcessEnv)
    }

    /// Like [`instance`](Settings::instance), against an explicit registry
    /// and environment
    fn instance_in(registry: &Registry, env: &dyn EnvSource) -> Result<&'static Self, ConfigError> {
        registry.get_or_try_init(|| Self::resolve_from(env).map_err(ConfigErrors::into_first))
    }

    /// The process-wide instance, panicking with every configuration error
    fn load() -> &'static Self {
        match Registry::global().get_or_try_init(|| Self::resolve_from(&ProcessEnv)) {
            Ok(instance) => instance,
            Err(errors) => panic!("{}", errors),
        }
    }

    /// Method-style lookup, case-insensitive
    fn get(&self, name: &str) -> Result<&Value, ConfigError> {
        self.values().get(name)
    }

    /// Every declared field with its resolved value
    fn all(&self) -> &Resolved {
        self.values()
    }

    /// Whether `name` is a declared field, case-insensitive
    fn exists(&self, name: &str) -> bool {
        self.values().contains(name)
    }

    /// Where the value of `name` came from
    fn source(&self, name: &str) -> Result<Source, ConfigError> {
        self.values().source(name)
    }
}
