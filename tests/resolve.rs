use enver::{ConfigError, MapEnv, Registry, Settings, Source, Value, define_settings};

define_settings! {
    #[derive(Debug)]
    pub struct DbSettings {
        #[field(env = "HOST", default = "127.0.0.1")]
        pub host: String,

        #[field(env = "PORT", default = 5432)]
        pub port: i64,

        #[field(env = "PASSWORD", doc = "Database password")]
        pub password: String,
    }
}

define_settings! {
    pub struct RatioSettings {
        #[field(env = "RATIO", default = 1.0)]
        pub ratio: f64,
    }
}

define_settings! {
    pub struct EmptySettings {}
}

define_settings! {
    #[derive(Debug)]
    pub struct MixedSettings {
        #[field(default = true)]
        pub bool_value: bool,

        #[field(default = vec![1, 2, 3])]
        pub list_value: Vec<i64>,

        #[field(default = None)]
        pub another_secret: Option<String>,

        pub optional: Option<String>,

        #[field(default = Some(8))]
        pub workers: Option<u32>,
    }
}

#[test]
fn test_env_fills_required_and_defaults_fill_the_rest() {
    let env = MapEnv::new().with("PASSWORD", "secret");
    let config = DbSettings::resolve_from(&env).unwrap();

    assert_eq!(*config.host, "127.0.0.1");
    assert_eq!(config.port, 5432);
    assert_eq!(*config.password, "secret");
    assert_eq!(config.host.source, Source::Default);
    assert_eq!(config.password.source, Source::Environment);
}

#[test]
fn test_missing_required_field_fails_construction() {
    let env = MapEnv::new();
    let errors = DbSettings::resolve_from(&env).unwrap_err();

    assert_eq!(errors.len(), 1);
    match errors.first() {
        ConfigError::MissingRequiredField { key, schema, description } => {
            assert_eq!(key, "PASSWORD");
            assert_eq!(schema, "DbSettings");
            assert_eq!(description, "Database password");
        }
        other => panic!("expected MissingRequiredField, got {:?}", other),
    }
}

#[test]
fn test_missing_required_field_via_instance() {
    let registry = Registry::new();
    let err = DbSettings::instance_in(&registry, &MapEnv::new()).unwrap_err();

    assert!(err.is_missing());
    assert_eq!(err.key(), "PASSWORD");
    assert!(!registry.contains::<DbSettings>());
}

#[test]
fn test_environment_overrides_default() {
    let env = MapEnv::new()
        .with("PASSWORD", "secret")
        .with("HOST", "db.internal")
        .with("PORT", "6543");
    let config = DbSettings::resolve_from(&env).unwrap();

    assert_eq!(*config.host, "db.internal");
    assert_eq!(config.port, 6543);
    assert_eq!(config.get("port").unwrap(), &Value::Int(6543));
}

#[test]
fn test_env_match_uses_declared_case() {
    let env = MapEnv::new().with("password", "secret");
    let errors = DbSettings::resolve_from(&env).unwrap_err();

    assert!(errors.first().is_missing());
}

#[test]
fn test_float_is_coerced_from_env() {
    let env = MapEnv::new().with("RATIO", "1.5");
    let config = RatioSettings::resolve_from(&env).unwrap();

    assert_eq!(config.ratio, 1.5);
    assert_eq!(config["RATIO"], Value::Float(1.5));

    let config = RatioSettings::resolve_from(&MapEnv::new()).unwrap();
    assert_eq!(config.ratio, 1.0);
}

#[test]
fn test_coercion_error_is_not_reported_as_missing() {
    let env = MapEnv::new().with("PASSWORD", "secret").with("PORT", "not-a-number");
    let errors = DbSettings::resolve_from(&env).unwrap_err();

    match errors.first() {
        ConfigError::TypeCoercion { key, value, source, .. } => {
            assert_eq!(key, "PORT");
            assert_eq!(value, "not-a-number");
            assert_eq!(source.expected, "integer");
        }
        other => panic!("expected TypeCoercion, got {:?}", other),
    }
}

#[test]
fn test_first_error_follows_declaration_order() {
    let env = MapEnv::new().with("PORT", "abc");
    let registry = Registry::new();

    let errors = DbSettings::resolve_from(&env).unwrap_err();
    let keys: Vec<_> = errors.iter().map(|e| e.key().to_string()).collect();
    assert_eq!(keys, ["PORT", "PASSWORD"]);

    let err = DbSettings::instance_in(&registry, &env).unwrap_err();
    assert!(matches!(err, ConfigError::TypeCoercion { .. }));
}

#[test]
fn test_empty_schema() {
    let config = EmptySettings::resolve_from(&MapEnv::new()).unwrap();

    assert!(config.all().is_empty());
    assert_eq!(config.all().iter().count(), 0);
    assert!(EmptySettings::schema().is_empty());
}

#[test]
fn test_defaults_of_every_kind() {
    let config = MixedSettings::resolve_from(&MapEnv::new()).unwrap();

    assert!(*config.bool_value);
    assert_eq!(*config.list_value, vec![1, 2, 3]);
    assert_eq!(config.another_secret, None);
    assert_eq!(config.workers, Some(8));
    assert_eq!(config.another_secret.source, Source::Default);
}

#[test]
fn test_optional_without_default_is_absent_not_missing() {
    let config = MixedSettings::resolve_from(&MapEnv::new()).unwrap();

    assert_eq!(config.optional, None);
    assert_eq!(config.optional.source, Source::Absent);
    assert!(config["OPTIONAL"].is_null());
    assert!(!MixedSettings::schema().field("OPTIONAL").unwrap().required);
}

#[test]
fn test_collection_and_optional_values_from_env() {
    let env = MapEnv::new()
        .with("BOOL_VALUE", "off")
        .with("LIST_VALUE", "[4, 5]")
        .with("OPTIONAL", "set")
        .with("WORKERS", "2");
    let config = MixedSettings::resolve_from(&env).unwrap();

    assert!(!*config.bool_value);
    assert_eq!(*config.list_value, vec![4, 5]);
    assert_eq!(config.optional.as_deref(), Some("set"));
    assert_eq!(config.workers, Some(2));
    assert_eq!(
        config["list_value"],
        Value::List(vec![Value::Int(4), Value::Int(5)])
    );
}

#[test]
fn test_invalid_list_item_is_a_coercion_error() {
    let env = MapEnv::new().with("LIST_VALUE", "1,two");
    let errors = MixedSettings::resolve_from(&env).unwrap_err();

    assert!(matches!(
        errors.first(),
        ConfigError::TypeCoercion { key, .. } if key == "LIST_VALUE"
    ));
}
