//! Synthesis context and state.
//!
//! The `SynthesisContext` holds the bookkeeping threaded through the
//! recursive synthesis of one record: the active view length, loop nesting,
//! and how many view resizes were emitted.

use binidl_ir::{Name, SchemaError};
use binidl_layout::Strategy;

use crate::plan::{IndexVar, Op};

/// View state saved on loop entry.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct LoopScope {
    view: Option<usize>,
    resizes: usize,
}

/// Generation-time state for one record's procedure.
#[derive(Clone, Debug)]
pub struct SynthesisContext {
    record: Name,
    strategy: Strategy,
    /// Length of the active view, or `None` when it is not known here.
    view: Option<usize>,
    /// Number of index variables in use.
    depth: usize,
    resizes: usize,
}

impl SynthesisContext {
    pub fn new(record: Name, strategy: Strategy) -> Self {
        SynthesisContext {
            record,
            strategy,
            view: None,
            depth: 0,
            resizes: 0,
        }
    }

    pub fn record(&self) -> &Name {
        &self.record
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Make the active view `len` bytes long, emitting a resize only when
    /// its length is not already known to be `len`.
    ///
    /// Static procedures own a single exactly-sized buffer and never resize.
    pub fn resize(&mut self, len: usize, ops: &mut Vec<Op>) {
        if self.strategy == Strategy::Static || self.view == Some(len) {
            return;
        }
        ops.push(Op::Resize(len));
        self.view = Some(len);
        self.resizes += 1;
    }

    /// Claim the next index variable for a loop over `field`.
    pub fn push_index(&mut self, field: &Name) -> Result<IndexVar, SchemaError> {
        let var = IndexVar::at_depth(self.depth).ok_or_else(|| SchemaError::NestingTooDeep {
            record: self.record.clone(),
            field: field.clone(),
            limit: IndexVar::LIMIT,
        })?;
        self.depth += 1;
        Ok(var)
    }

    pub fn pop_index(&mut self) {
        debug_assert!(self.depth > 0, "pop_index without push_index");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Enter a loop body.
    ///
    /// The body is first synthesized against the view from before the loop.
    /// That only holds if the body never resizes; see
    /// [`resized_in`](Self::resized_in) and [`restart_loop`](Self::restart_loop).
    pub fn enter_loop(&self) -> LoopScope {
        LoopScope {
            view: self.view,
            resizes: self.resizes,
        }
    }

    /// Whether the body entered with `scope` has resized the view.
    pub fn resized_in(&self, scope: LoopScope) -> bool {
        self.resizes != scope.resizes
    }

    /// Discard a body that resized and start it again with the view
    /// unknown, since each iteration after the first begins with whatever
    /// view the previous one left.
    pub fn restart_loop(&mut self, scope: LoopScope) {
        self.resizes = scope.resizes;
        self.view = None;
    }

    /// Leave a loop body.
    ///
    /// A body that resized leaves the view unknown. A body that did not
    /// leaves the view as it was before the loop.
    pub fn exit_loop(&mut self, scope: LoopScope) {
        self.view = if self.resized_in(scope) {
            None
        } else {
            scope.view
        };
    }

    /// Resizes emitted so far.
    pub fn resizes(&self) -> usize {
        self.resizes
    }
}
