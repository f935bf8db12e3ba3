//! Layout analysis for binidl schemas.
//!
//! This crate turns a [`TypeGraph`](binidl_ir::TypeGraph) into per-record
//! layout facts:
//!
//! - **[`LayoutInfo`]** - fixed size, contiguous byte runs, widths, and the
//!   [`LayoutFlags`] that say whether a type is variable-length, must
//!   delegate to other codecs, or reads length prefixes
//! - **[`FieldClass`]** - how each field is encoded: inline primitive,
//!   inlined record, dispatched record, or array of one of those
//! - **[`Strategy`]** - static single-buffer vs. streaming marshaling,
//!   picked by [`select_strategy`]
//!
//! # Design
//!
//! Analysis runs in two passes over the whole graph. The first resolves
//! every field type and walks the by-value containment edges depth-first,
//! rejecting cycles. The second analyzes records in the post-order the first
//! pass produced, so a record's by-value children always have their layout
//! before the record itself is analyzed. Declaration order never matters:
//! a field may reference a record declared after it.
//!
//! Variable-length arrays are not by-value edges. They are the only
//! indirection a schema has, so a record may contain a `[]Self`.

mod analyze;
mod flags;
mod info;
mod strategy;

pub use analyze::{analyze, LayoutAnalyzer, Layouts};
pub use binidl_ir::SchemaError;
pub use flags::LayoutFlags;
pub use info::{Element, FieldClass, LayoutInfo, RecordLayout};
pub use strategy::{select_strategy, Strategy, DEFAULT_STATIC_THRESHOLD};
