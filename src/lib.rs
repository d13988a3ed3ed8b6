//! Typed settings resolved from environment variables.
//!
//! Declare a settings struct with [`define_settings!`]. Each field is read
//! from the environment variable with its declared name, falls back to its
//! declared default, and is coerced to the field's type. A field with neither
//! fails construction with [`ConfigError::MissingRequiredField`]. Each
//! settings type is constructed once per process and shared.
//!
//! ```rust
//! use enver::{Settings, define_settings};
//!
//! define_settings! {
//!     #[derive(Debug)]
//!     pub struct DbConfig {
//!         #[field(default = String::from("127.0.0.1"))]
//!         pub my_db_host: String,
//!
//!         #[field(default = 2700)]
//!         pub my_db_port: u16,
//!
//!         /// Read from the environment, there is no default
//!         pub my_db_pass: Option<String>,
//!     }
//! }
//!
//! let a = DbConfig::instance().unwrap();
//! let b = DbConfig::instance().unwrap();
//! assert!(std::ptr::eq(a, b));
//!
//! assert_eq!(*a.my_db_port, 2700);
//! assert_eq!(a["my_db_host"], "127.0.0.1");
//! assert_eq!(a.get("MY_DB_HOST").unwrap(), "127.0.0.1");
//! assert!(a.exists("my_db_pass"));
//! assert!(!a.exists("PATH"));
//! ```

// Lets the generated `::enver::` paths resolve inside this crate's own tests
extern crate self as enver;

pub mod coerce;
pub mod error;
pub mod field;
pub mod macros;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod settings;
pub mod source;
pub mod value;

pub use coerce::Coerce;
pub use error::{CoercionError, ConfigError, ConfigErrors};
pub use field::{Field, Source};
pub use registry::Registry;
pub use resolver::{Resolved, Resolver, resolve_field};
pub use schema::{FieldDecl, Schema};
pub use settings::Settings;
pub use source::{EnvSource, MapEnv, ProcessEnv};
pub use value::Value;

pub use enver_macros::define_settings;
