//! Dynamically typed values.

use std::fmt;

use binidl_ir::Name;

/// A value of some schema type, without a compiled Rust struct behind it.
///
/// Primitives keep their signedness so a decoded value compares equal to
/// the one that was encoded. Records keep fields in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    /// Fixed or variable-length array.
    Array(Vec<Value>),
    Record(Vec<(Name, Value)>),
}

impl Value {
    /// Build a record from `(field, value)` pairs.
    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::Record(
            fields
                .into_iter()
                .map(|(name, value)| (Name::new(name), value))
                .collect(),
        )
    }

    /// Build an array of unsigned values.
    pub fn unsigned_array(items: impl IntoIterator<Item = u64>) -> Self {
        Value::Array(items.into_iter().map(Value::Unsigned).collect())
    }

    /// Build an array of signed values.
    pub fn signed_array(items: impl IntoIterator<Item = i64>) -> Self {
        Value::Array(items.into_iter().map(Value::Signed).collect())
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Record(fields) => fields
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short description of the variant, for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Unsigned(_) => "unsigned integer",
            Value::Signed(_) => "signed integer",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Signed(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{v}"),
            Value::Signed(v) => write!(f, "{v}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {name}: {value}")?;
                }
                if !fields.is_empty() {
                    f.write_str(" ")?;
                }
                f.write_str("}")
            }
        }
    }
}
