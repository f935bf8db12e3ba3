//! The normalized type graph.
//!
//! A [`TypeGraph`] maps unique type names to [`TypeDef`]s and remembers the
//! order in which they were declared, so everything derived from it
//! (layouts, plans, emitted source) comes out in a stable order.

use rustc_hash::FxHashMap;

use crate::{Name, PrimitiveKind, SchemaError};

/// How many values a field holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arity {
    /// Exactly one value.
    Scalar,
    /// `[n]T`: exactly `n` values, count known at generation time.
    FixedArray(usize),
    /// `[]T`: a length-prefixed sequence.
    VariableArray,
}

/// What a field's type name refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeRef {
    /// A primitive named directly (`u32`, `int16`, `byte`, ...).
    Primitive(PrimitiveKind),
    /// A type defined in the graph.
    Named(Name),
}

impl TypeRef {
    /// Parse a type name, recognizing primitive spellings first.
    pub fn parse(name: &str) -> Self {
        match PrimitiveKind::from_name(name) {
            Some(kind) => TypeRef::Primitive(kind),
            None => TypeRef::Named(Name::new(name)),
        }
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }
}

/// A single record field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    pub name: Name,
    pub ty: TypeRef,
    pub arity: Arity,
}

impl Field {
    pub fn new(name: impl Into<Name>, ty: impl Into<TypeRef>, arity: Arity) -> Self {
        Field {
            name: name.into(),
            ty: ty.into(),
            arity,
        }
    }
}

/// A named type definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeDef {
    /// A distinct name for a primitive; layout-identical to it.
    Alias(PrimitiveKind),
    /// A composite of ordered fields.
    Record(Vec<Field>),
    /// A type whose codec is defined outside the schema.
    ///
    /// `path` is the Rust path emitted code uses to name it. Its layout is
    /// unknown, so fields of this type are always dispatched.
    External { path: Box<str> },
}

impl TypeDef {
    /// The fields of a record, or `None` for aliases and external types.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            TypeDef::Record(fields) => Some(fields),
            TypeDef::Alias(_) | TypeDef::External { .. } => None,
        }
    }
}

/// Mapping from type name to definition, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<(Name, TypeDef)>", into = "Vec<(Name, TypeDef)>")
)]
pub struct TypeGraph {
    defs: Vec<(Name, TypeDef)>,
    index: FxHashMap<Name, usize>,
}

impl TypeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a graph declaration by declaration.
    pub fn builder() -> TypeGraphBuilder {
        TypeGraphBuilder::default()
    }

    /// Add a definition. Names must be unique.
    pub fn insert(&mut self, name: impl Into<Name>, def: TypeDef) -> Result<(), SchemaError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(SchemaError::DuplicateType { name });
        }
        self.index.insert(name.clone(), self.defs.len());
        self.defs.push((name, def));
        Ok(())
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.index.get(name).map(|&i| &self.defs[i].1)
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declaration position of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &TypeDef)> {
        self.defs.iter().map(|(name, def)| (name, def))
    }

    /// Record definitions in declaration order.
    pub fn records(&self) -> impl Iterator<Item = (&Name, &[Field])> {
        self.defs
            .iter()
            .filter_map(|(name, def)| def.fields().map(|fields| (name, fields)))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl TryFrom<Vec<(Name, TypeDef)>> for TypeGraph {
    type Error = SchemaError;

    fn try_from(defs: Vec<(Name, TypeDef)>) -> Result<Self, Self::Error> {
        let mut graph = TypeGraph::new();
        for (name, def) in defs {
            graph.insert(name, def)?;
        }
        Ok(graph)
    }
}

impl From<TypeGraph> for Vec<(Name, TypeDef)> {
    fn from(graph: TypeGraph) -> Self {
        graph.defs
    }
}

/// Incremental construction of a [`TypeGraph`].
///
/// Errors (duplicate names, malformed array lengths) are collected and the
/// first one is reported by [`build`](Self::build), so declarations can be
/// chained without checking each step.
#[derive(Default)]
pub struct TypeGraphBuilder {
    graph: TypeGraph,
    error: Option<SchemaError>,
}

impl TypeGraphBuilder {
    /// Declare an alias for a primitive.
    #[must_use]
    pub fn alias(self, name: &str, underlying: PrimitiveKind) -> Self {
        self.define(name, TypeDef::Alias(underlying))
    }

    /// Declare a type whose codec lives outside the schema.
    #[must_use]
    pub fn external(self, name: &str, path: &str) -> Self {
        self.define(name, TypeDef::External { path: path.into() })
    }

    /// Declare a record; `fields` receives an empty [`RecordBuilder`].
    #[must_use]
    pub fn record(mut self, name: &str, fields: impl FnOnce(RecordBuilder) -> RecordBuilder) -> Self {
        let built = fields(RecordBuilder::new(name));
        if let Some(err) = built.error {
            if self.error.is_none() {
                self.error = Some(err);
            }
            return self;
        }
        self.define(name, TypeDef::Record(built.fields))
    }

    /// Finish, reporting the first error encountered.
    pub fn build(self) -> Result<TypeGraph, SchemaError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.graph),
        }
    }

    fn define(mut self, name: &str, def: TypeDef) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.graph.insert(name, def) {
                self.error = Some(err);
            }
        }
        self
    }
}

/// Field list of a single record under construction.
pub struct RecordBuilder {
    record: Name,
    fields: Vec<Field>,
    error: Option<SchemaError>,
}

impl RecordBuilder {
    fn new(record: &str) -> Self {
        RecordBuilder {
            record: Name::new(record),
            fields: Vec::new(),
            error: None,
        }
    }

    /// A scalar field.
    #[must_use]
    pub fn field(self, name: &str, ty: &str) -> Self {
        self.push(name, ty, Arity::Scalar)
    }

    /// A fixed-size array field `[len]ty`.
    #[must_use]
    pub fn array(self, name: &str, ty: &str, len: usize) -> Self {
        self.push(name, ty, Arity::FixedArray(len))
    }

    /// A fixed-size array whose length is given as source text.
    ///
    /// The literal must be a plain decimal integer.
    #[must_use]
    pub fn array_lit(mut self, name: &str, ty: &str, literal: &str) -> Self {
        match parse_array_len(literal) {
            Some(len) => self.push(name, ty, Arity::FixedArray(len)),
            None => {
                if self.error.is_none() {
                    self.error = Some(SchemaError::InvalidArrayLength {
                        record: self.record.clone(),
                        field: Name::new(name),
                        literal: literal.to_string(),
                    });
                }
                self
            }
        }
    }

    /// A variable-length array field `[]ty`.
    #[must_use]
    pub fn vec(self, name: &str, ty: &str) -> Self {
        self.push(name, ty, Arity::VariableArray)
    }

    fn push(mut self, name: &str, ty: &str, arity: Arity) -> Self {
        self.fields.push(Field::new(name, TypeRef::parse(ty), arity));
        self
    }
}

/// Parse an array length literal: ASCII digits only, no sign, no suffix.
fn parse_array_len(literal: &str) -> Option<usize> {
    if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    literal.parse().ok()
}
