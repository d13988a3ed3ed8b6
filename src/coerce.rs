use crate::error::CoercionError;
use crate::value::Value;
use std::path::PathBuf;

/// Conversion from a raw environment string into a declared field type
///
/// Implemented for `String`, every integer width, `f32`/`f64`, `bool`,
/// `PathBuf`, `Vec<T>` and `Option<T>`. Other scalar types can opt in with
/// [`coerce_from_str!`](crate::coerce_from_str).
pub trait Coerce: Sized {
    /// Short name of the type kind, used in schema metadata and errors
    const KIND: &'static str;

    /// Whether an unset variable without a default resolves to an absent
    /// value instead of failing
    const NULLABLE: bool = false;

    fn coerce(raw: &str) -> Result<Self, CoercionError>;

    fn to_value(&self) -> Value;

    /// The value used when neither environment nor default provide one
    fn absent() -> Option<Self> {
        None
    }
}

impl Coerce for String {
    const KIND: &'static str = "string";

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        Ok(raw.to_string())
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl Coerce for PathBuf {
    const KIND: &'static str = "path";

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        Ok(PathBuf::from(raw))
    }

    fn to_value(&self) -> Value {
        Value::Str(self.to_string_lossy().into_owned())
    }
}

macro_rules! coerce_integer {
    ($($ty:ty),*) => {
        $(
            impl Coerce for $ty {
                const KIND: &'static str = "integer";

                fn coerce(raw: &str) -> Result<Self, CoercionError> {
                    raw.trim()
                        .parse()
                        .map_err(|e| CoercionError::new(Self::KIND, e))
                }

                fn to_value(&self) -> Value {
                    Value::Int(*self as i128)
                }
            }
        )*
    };
}

coerce_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

// u128 does not fit the shared integer representation losslessly
impl Coerce for u128 {
    const KIND: &'static str = "integer";

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        raw.trim()
            .parse()
            .map_err(|e| CoercionError::new(Self::KIND, e))
    }

    fn to_value(&self) -> Value {
        match i128::try_from(*self) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Str(self.to_string()),
        }
    }
}

impl Coerce for f64 {
    const KIND: &'static str = "float";

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        raw.trim()
            .parse()
            .map_err(|e| CoercionError::new(Self::KIND, e))
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl Coerce for f32 {
    const KIND: &'static str = "float";

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        raw.trim()
            .parse()
            .map_err(|e| CoercionError::new(Self::KIND, e))
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

const TRUTHY: &[&str] = &["1", "true", "t", "yes", "y", "on"];
const FALSY: &[&str] = &["0", "false", "f", "no", "n", "off"];

impl Coerce for bool {
    const KIND: &'static str = "boolean";

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        let token = raw.trim();
        if TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            Ok(true)
        } else if FALSY.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            Ok(false)
        } else {
            Err(CoercionError::new(
                Self::KIND,
                format!("'{}' is not one of {} or {}", token, TRUTHY.join("/"), FALSY.join("/")),
            ))
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl<T: Coerce> Coerce for Option<T> {
    const KIND: &'static str = T::KIND;
    const NULLABLE: bool = true;

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        T::coerce(raw).map(Some)
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

/// Lists accept either a JSON array (`[1, 2, 3]`) or comma-separated items
/// (`a,b,c`); every item is coerced with the element type. A JSON `null`
/// item is the element's absent value when it has one.
impl<T: Coerce> Coerce for Vec<T> {
    const KIND: &'static str = "list";

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            let items: Vec<serde_json::Value> = serde_json::from_str(trimmed)
                .map_err(|e| CoercionError::new(Self::KIND, e))?;
            items
                .iter()
                .map(|item| match item {
                    serde_json::Value::Null => match T::absent() {
                        Some(value) => Ok(value),
                        None => coerce_item::<T>("null"),
                    },
                    serde_json::Value::String(s) => coerce_item::<T>(s),
                    other => coerce_item::<T>(&other.to_string()),
                })
                .collect()
        } else if trimmed.is_empty() {
            Ok(Vec::new())
        } else {
            trimmed.split(',').map(|item| coerce_item::<T>(item.trim())).collect()
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Coerce::to_value).collect())
    }
}

fn coerce_item<T: Coerce>(item: &str) -> Result<T, CoercionError> {
    T::coerce(item).map_err(|e| {
        CoercionError::new(
            Vec::<T>::KIND,
            format!("item '{}' is not a valid {}: {}", item, e.expected, e.reason),
        )
    })
}
