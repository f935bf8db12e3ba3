//! binidl IR - the schema model.
//!
//! This crate contains the passive data the generator consumes:
//! - [`Name`] for type and field identifiers
//! - [`PrimitiveKind`] for the fixed-width numeric leaves
//! - [`TypeGraph`] / [`TypeDef`] / [`Field`] for the normalized schema
//! - [`Endian`] for the global byte order chosen at generation time
//! - [`SchemaError`] for every generation-time failure
//!
//! The graph is produced by an external front-end (or by
//! [`TypeGraph::builder`]) and is immutable once built. Layout facts are
//! derived from it by `binidl_layout`; nothing here knows about buffers,
//! runs or strategies.
//!
//! # Serialization
//!
//! With the `serde` feature, every schema type derives `Serialize` and
//! `Deserialize`, so a loader can hand the generator a graph read from disk.
//! A deserialized graph goes through the same duplicate-name check as one
//! built in code.

mod endian;
mod error;
mod graph;
mod name;
mod primitive;

pub use endian::Endian;
pub use error::SchemaError;
pub use graph::{Arity, Field, RecordBuilder, TypeDef, TypeGraph, TypeGraphBuilder, TypeRef};
pub use name::Name;
pub use primitive::PrimitiveKind;
