/// Implements [`Coerce`](crate::Coerce) for types with `FromStr` (whose
/// error is `Display`) and `Display`, so they can be used as settings fields.
///
/// The resolved value is exposed to name-based lookups as its `Display`
/// string. An optional kind name may be given; it defaults to `string`.
///
/// ```rust
/// use enver::{Coerce, coerce_from_str};
/// use std::net::IpAddr;
///
/// #[derive(Debug, PartialEq)]
/// struct Host(IpAddr);
///
/// impl std::str::FromStr for Host {
///     type Err = std::net::AddrParseError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Host)
///     }
/// }
///
/// impl std::fmt::Display for Host {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         self.0.fmt(f)
///     }
/// }
///
/// coerce_from_str!(Host, "ip address");
///
/// assert_eq!(Host::coerce("127.0.0.1").unwrap().to_string(), "127.0.0.1");
/// assert_eq!(Host::coerce("localhost").unwrap_err().expected, "ip address");
/// ```
#[macro_export]
macro_rules! coerce_from_str {
    ($ty:ty) => {
        $crate::coerce_from_str!($ty, "string");
    };
    ($ty:ty, $kind:expr) => {
        impl $crate::Coerce for $ty {
            const KIND: &'static str = $kind;

            fn coerce(raw: &str) -> ::core::result::Result<Self, $crate::CoercionError> {
                <$ty as ::core::str::FromStr>::from_str(raw.trim())
                    .map_err(|e| $crate::CoercionError::new($kind, e))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Str(::std::string::ToString::to_string(self))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Coerce, Value};
    use std::fmt;
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Prod,
        Dev,
    }

    impl FromStr for Mode {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "prod" | "production" => Ok(Self::Prod),
                "dev" | "development" => Ok(Self::Dev),
                _ => Err(format!("expected 'dev' or 'prod', got '{}'", s)),
            }
        }
    }

    impl fmt::Display for Mode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Prod => write!(f, "prod"),
                Self::Dev => write!(f, "dev"),
            }
        }
    }

    coerce_from_str!(Mode, "mode");

    #[test]
    fn test_from_str_types_coerce() {
        assert_eq!(Mode::coerce("production").unwrap(), Mode::Prod);
        assert_eq!(Mode::coerce(" dev ").unwrap(), Mode::Dev);
        assert_eq!(Mode::Dev.to_value(), Value::Str("dev".to_string()));
        assert_eq!(Mode::KIND, "mode");
    }

    #[test]
    fn test_from_str_errors_carry_reason() {
        let err = Mode::coerce("staging").unwrap_err();
        assert_eq!(err.expected, "mode");
        assert!(err.reason.contains("got 'staging'"));
    }

    #[test]
    fn test_from_str_types_work_in_collections() {
        let modes = <Vec<Mode>>::coerce("prod,dev").unwrap();
        assert_eq!(modes, vec![Mode::Prod, Mode::Dev]);
        assert_eq!(<Option<Mode>>::coerce("dev").unwrap(), Some(Mode::Dev));
    }
}
