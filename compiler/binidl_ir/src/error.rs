//! Generation-time errors.

use crate::Name;

/// A defect in the schema, found before any code is produced.
///
/// Every variant is fatal to the generation run and names the offending
/// type (and field, where there is one).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two definitions share a name.
    #[error("duplicate definition of type `{name}`")]
    DuplicateType { name: Name },

    /// A field references a type that is neither primitive nor defined.
    #[error("field `{record}.{field}` references unknown type `{type_ref}`")]
    UnresolvedType {
        record: Name,
        field: Name,
        type_ref: Name,
    },

    /// A fixed-array length is not a plain non-negative integer.
    #[error("field `{record}.{field}` has invalid array length `{literal}`: expected a non-negative integer")]
    InvalidArrayLength {
        record: Name,
        field: Name,
        literal: String,
    },

    /// A record contains itself by value, directly or through other records.
    ///
    /// `cycle` starts and ends with the same type.
    #[error("type `{}` contains itself by value: {}", .cycle.first().map_or("?", Name::as_str), format_cycle(.cycle))]
    CyclicByValue { cycle: Vec<Name> },

    /// Loop nesting exceeded the number of available index variables.
    #[error("field `{record}.{field}` nests loops deeper than {limit} levels")]
    NestingTooDeep {
        record: Name,
        field: Name,
        limit: usize,
    },

    /// A field makes the record's encoded size overflow `usize`.
    #[error("field `{record}.{field}` makes the encoded size of `{record}` overflow")]
    SizeOverflow { record: Name, field: Name },

    /// Codec generation was requested for a type that is not a record.
    #[error("type `{name}` is not a record")]
    NotARecord { name: Name },

    /// Codec generation was requested for a type that is not in the graph.
    #[error("unknown type `{name}`")]
    UnknownType { name: Name },
}

fn format_cycle(cycle: &[Name]) -> String {
    cycle
        .iter()
        .map(Name::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
