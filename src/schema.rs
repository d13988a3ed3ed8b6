/// Static description of one declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    /// Declared name; also the exact environment variable name
    pub name: &'static str,
    /// Rust field identifier on the generated struct
    pub ident: &'static str,
    /// Type kind, see [`Coerce::KIND`](crate::Coerce::KIND)
    pub kind: &'static str,
    pub description: &'static str,
    /// Source text of the default expression, if one was declared
    pub default: Option<&'static str>,
    /// No default and not nullable
    pub required: bool,
}

impl FieldDecl {
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The closed, ordered set of fields of one settings type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldDecl],
}

impl Schema {
    /// Case-insensitive field lookup
    pub fn field(&self, name: &str) -> Option<&'static FieldDecl> {
        self.fields.iter().find(|f| f.matches(name))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.matches(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn required(&self) -> impl Iterator<Item = &'static FieldDecl> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
