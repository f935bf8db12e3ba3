//! Plan execution.
//!
//! The interpreter runs a record's [`CodecPlan`] the way the emitted Rust
//! does, one op at a time: the same buffer, the same active view, the same
//! reads and writes against the sink or source. Wire output is therefore
//! byte-identical to generated code for the same graph and config.
//!
//! View tracking mirrors the scoping of emitted code. A streaming loop body
//! that resizes starts every iteration with no active view, and the view is
//! gone after the loop. A body that never resizes works in the view from
//! before the loop, which stays in effect afterwards. Any store, load, write
//! or fill outside an active view is a malformed plan.
//!
//! Decoded sequences grow one element per iteration, never to the length
//! prefix up front, exactly as generated code does.

use std::io::{Read, Write};

use binidl_codegen::plan::contains_resize;
use binidl_codegen::{CodecPlan, GeneratorConfig, IndexVar, LoopCount, Op, Path, PlanSet, Step};
use binidl_ir::{Arity, Endian, Field, Name, PrimitiveKind, SchemaError, TypeDef, TypeGraph, TypeRef};
use binidl_layout::Strategy;
use binidl_rt::{BinarySize, ByteOrder, ByteRead, ByteReader};
use tracing::trace;

use crate::{EvalError, Value};

/// Executes synthesized plans against [`Value`]s.
pub struct Interpreter<'g> {
    graph: &'g TypeGraph,
    plans: PlanSet,
    order: ByteOrder,
}

impl<'g> Interpreter<'g> {
    /// Plan every record of `graph` under `config`.
    pub fn new(graph: &'g TypeGraph, config: &GeneratorConfig) -> Result<Self, EvalError> {
        let plans = binidl_codegen::synthesize(graph, config)?;
        Ok(Self::with_plans(graph, plans))
    }

    /// Use plans that were synthesized from `graph` elsewhere.
    pub fn with_plans(graph: &'g TypeGraph, plans: PlanSet) -> Self {
        let order = match plans.endian {
            Endian::Little => ByteOrder::Little,
            Endian::Big => ByteOrder::Big,
        };
        Interpreter {
            graph,
            plans,
            order,
        }
    }

    pub fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    pub fn plans(&self) -> &PlanSet {
        &self.plans
    }

    /// What the generated `binary_size` of `ty` reports.
    pub fn binary_size(&self, ty: &str) -> Result<BinarySize, EvalError> {
        let plan = self.plan(ty)?;
        Ok(BinarySize::new(plan.fixed_size, plan.size_is_exact))
    }

    /// The all-zero value of `ty`: zero primitives, zeroed fixed arrays,
    /// empty sequences.
    pub fn zero_value(&self, ty: &str) -> Result<Value, EvalError> {
        match self.graph.get(ty) {
            Some(TypeDef::Record(fields)) => fields
                .iter()
                .map(|field| Ok((field.name.clone(), self.zero_field(field)?)))
                .collect::<Result<Vec<_>, EvalError>>()
                .map(Value::Record),
            Some(TypeDef::Alias(kind)) => Ok(zero_primitive(*kind)),
            Some(TypeDef::External { .. }) => Err(EvalError::External(Name::new(ty))),
            None => Err(EvalError::UnknownType(Name::new(ty))),
        }
    }

    fn zero_field(&self, field: &Field) -> Result<Value, EvalError> {
        match field.arity {
            Arity::Scalar => self.zero_element(&field.ty),
            Arity::FixedArray(len) => {
                let elem = self.zero_element(&field.ty)?;
                Ok(Value::Array(vec![elem; len]))
            }
            Arity::VariableArray => Ok(Value::Array(Vec::new())),
        }
    }

    fn zero_element(&self, ty: &TypeRef) -> Result<Value, EvalError> {
        match ty {
            TypeRef::Primitive(kind) => Ok(zero_primitive(*kind)),
            TypeRef::Named(name) => self.zero_value(name.as_str()),
        }
    }

    /// Encode `value` as type `ty` into `w`.
    pub fn marshal<W: Write + ?Sized>(
        &self,
        ty: &str,
        value: &Value,
        w: &mut W,
    ) -> Result<(), EvalError> {
        let plan = self.plan(ty)?;
        trace!(record = ty, strategy = ?plan.strategy, "marshal");
        let mut frame = Frame::new(plan);
        self.run_marshal(&plan.marshal, &mut frame, value, w)
    }

    pub fn marshal_to_vec(&self, ty: &str, value: &Value) -> Result<Vec<u8>, EvalError> {
        let mut out = Vec::new();
        self.marshal(ty, value, &mut out)?;
        Ok(out)
    }

    /// Decode a fresh value of type `ty` from `r`.
    pub fn unmarshal<R: Read + ?Sized>(&self, ty: &str, r: &mut R) -> Result<Value, EvalError> {
        let mut value = self.zero_value(ty)?;
        self.unmarshal_into(ty, &mut value, r)?;
        Ok(value)
    }

    /// Decode into an existing value, reusing its sequence allocations.
    ///
    /// `r` is read through a single [`ByteReader`], which never consumes
    /// bytes past the end of the encoding. On error `value` may be partly
    /// overwritten and must not be treated as decoded.
    pub fn unmarshal_into<R: Read + ?Sized>(
        &self,
        ty: &str,
        value: &mut Value,
        r: &mut R,
    ) -> Result<(), EvalError> {
        self.unmarshal_buffered(ty, value, &mut ByteReader::new(r))
    }

    /// Decode into `value` from a source that already supports single-byte
    /// reads.
    pub fn unmarshal_buffered<R: ByteRead + ?Sized>(
        &self,
        ty: &str,
        value: &mut Value,
        r: &mut R,
    ) -> Result<(), EvalError> {
        let plan = self.plan(ty)?;
        trace!(record = ty, strategy = ?plan.strategy, "unmarshal");
        let mut frame = Frame::new(plan);
        self.run_unmarshal(&plan.unmarshal, &mut frame, value, r)
    }

    fn plan(&self, ty: &str) -> Result<&CodecPlan, EvalError> {
        if let Some(plan) = self.plans.get(ty) {
            return Ok(plan);
        }
        let name = Name::new(ty);
        Err(match self.graph.get(ty) {
            Some(TypeDef::External { .. }) => EvalError::External(name),
            Some(TypeDef::Alias(_)) => EvalError::Schema(SchemaError::NotARecord { name }),
            Some(TypeDef::Record(_)) | None => EvalError::UnknownType(name),
        })
    }

    fn run_marshal<W: Write + ?Sized>(
        &self,
        ops: &[Op],
        frame: &mut Frame<'_>,
        root: &Value,
        w: &mut W,
    ) -> Result<(), EvalError> {
        for op in ops {
            match op {
                Op::Resize(len) => frame.resize(*len)?,
                Op::Store { offset, kind, path } => {
                    let value = resolve(root, path, &frame.vars)?;
                    let bits = encode_primitive(value, *kind)
                        .map_err(|reason| shape(path, path.len(), reason))?;
                    binidl_rt::put_uint(frame.slot(*offset, kind.width())?, bits, self.order);
                }
                Op::Write => w.write_all(frame.active()?)?,
                Op::Dispatch { ty, path } => {
                    let value = resolve(root, path, &frame.vars)?;
                    self.marshal(ty.as_str(), value, w)?;
                }
                Op::WriteLen { path } => {
                    let len = array_len(resolve(root, path, &frame.vars)?, path)?;
                    binidl_rt::write_len(w, len)?;
                }
                Op::Loop { var, count, body } => {
                    let n = loop_count(count, root, &frame.vars)?;
                    let before = frame.enter_loop();
                    let resets = contains_resize(body);
                    for index in 0..n {
                        frame.begin_iteration(*var, index, resets);
                        self.run_marshal(body, frame, root, w)?;
                    }
                    frame.exit_loop(before, body);
                }
                Op::Load { .. } | Op::Fill | Op::ReadLen { .. } => {
                    return Err(frame.malformed("decode op in a marshal procedure"));
                }
            }
        }
        Ok(())
    }

    fn run_unmarshal<R: ByteRead + ?Sized>(
        &self,
        ops: &[Op],
        frame: &mut Frame<'_>,
        root: &mut Value,
        r: &mut R,
    ) -> Result<(), EvalError> {
        for op in ops {
            match op {
                Op::Resize(len) => frame.resize(*len)?,
                Op::Fill => r.read_exact(frame.active()?)?,
                Op::Load { offset, kind, path } => {
                    let bits = binidl_rt::get_uint(frame.slot(*offset, kind.width())?, self.order);
                    *resolve_mut(root, path, &frame.vars)? = decode_primitive(bits, *kind);
                }
                Op::Dispatch { ty, path } => {
                    let target = resolve_mut(root, path, &frame.vars)?;
                    self.unmarshal_buffered(ty.as_str(), target, r)?;
                }
                Op::ReadLen { path } => {
                    let len = binidl_rt::read_len(r)?;
                    binidl_rt::begin_seq(sequence_mut(root, path, &frame.vars)?, len);
                    frame.decoded_len = Some((path.clone(), len));
                }
                Op::Loop { var, count, body } => {
                    let decoded = match (count, frame.decoded_len.take()) {
                        (LoopCount::LenOf(path), Some((read, len))) if read == *path => {
                            Some((path, len, self.sequence_element(frame, path)?))
                        }
                        _ => None,
                    };
                    let n = match &decoded {
                        Some((_, len, _)) => *len,
                        None => loop_count(count, root, &frame.vars)?,
                    };
                    let before = frame.enter_loop();
                    let resets = contains_resize(body);
                    for index in 0..n {
                        frame.begin_iteration(*var, index, resets);
                        if let Some((path, _, elem)) = &decoded {
                            let items = sequence_mut(root, path, &frame.vars)?;
                            binidl_rt::seq_element(items, index, || elem.clone());
                        }
                        self.run_unmarshal(body, frame, root, r)?;
                    }
                    frame.exit_loop(before, body);
                }
                Op::Store { .. } | Op::Write | Op::WriteLen { .. } => {
                    return Err(frame.malformed("encode op in an unmarshal procedure"));
                }
            }
        }
        Ok(())
    }

    /// Zero value of one element of the sequence field `path` points at.
    fn sequence_element(&self, frame: &Frame<'_>, path: &Path) -> Result<Value, EvalError> {
        let mut record = frame.plan.record.as_str();
        let mut field: Option<&Field> = None;
        for step in path {
            let Step::Field(name) = step else {
                continue;
            };
            if let Some(outer) = field {
                record = match &outer.ty {
                    TypeRef::Named(ty) => ty.as_str(),
                    TypeRef::Primitive(_) => {
                        return Err(frame.malformed(format!("field path steps into primitive `{}`", outer.name)))
                    }
                };
            }
            field = self
                .graph
                .get(record)
                .and_then(TypeDef::fields)
                .and_then(|fields| fields.iter().find(|f| f.name == *name));
            if field.is_none() {
                return Err(frame.malformed(format!("`{record}` has no field `{name}`")));
            }
        }
        match field {
            Some(field) => self.zero_element(&field.ty),
            None => Err(frame.malformed("length prefix without a field")),
        }
    }
}

/// Per-call execution state: the buffer, the active view, loop indices.
struct Frame<'p> {
    plan: &'p CodecPlan,
    buf: Vec<u8>,
    view: Option<usize>,
    vars: [usize; IndexVar::LIMIT],
    /// Length prefix just read, for the element loop that follows it.
    decoded_len: Option<(Path, usize)>,
}

impl<'p> Frame<'p> {
    fn new(plan: &'p CodecPlan) -> Self {
        let view = (plan.strategy == Strategy::Static).then_some(plan.buffer_len);
        Frame {
            plan,
            buf: vec![0; plan.buffer_len],
            view,
            vars: [0; IndexVar::LIMIT],
            decoded_len: None,
        }
    }

    fn streaming(&self) -> bool {
        self.plan.strategy == Strategy::Streaming
    }

    fn resize(&mut self, len: usize) -> Result<(), EvalError> {
        if !self.streaming() {
            return Err(self.malformed("resize in a static plan"));
        }
        if len > self.buf.len() {
            return Err(self.malformed(format!(
                "view of {len} bytes exceeds scratch of {}",
                self.buf.len()
            )));
        }
        self.view = Some(len);
        Ok(())
    }

    fn active(&mut self) -> Result<&mut [u8], EvalError> {
        let len = self
            .view
            .ok_or_else(|| self.malformed("buffer used before any resize"))?;
        Ok(&mut self.buf[..len])
    }

    fn slot(&mut self, offset: usize, width: usize) -> Result<&mut [u8], EvalError> {
        let end = offset + width;
        let len = self
            .view
            .ok_or_else(|| self.malformed("buffer used before any resize"))?;
        if end > len {
            return Err(self.malformed(format!("bytes {offset}..{end} outside a view of {len}")));
        }
        Ok(&mut self.buf[offset..end])
    }

    fn enter_loop(&self) -> Option<usize> {
        self.view
    }

    /// Bind `var` for the next iteration. A body that resizes starts each
    /// iteration without a view.
    fn begin_iteration(&mut self, var: IndexVar, index: usize, resets: bool) {
        self.vars[var.depth()] = index;
        if resets && self.streaming() {
            self.view = None;
        }
    }

    fn exit_loop(&mut self, before: Option<usize>, body: &[Op]) {
        if self.streaming() {
            self.view = if contains_resize(body) { None } else { before };
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> EvalError {
        EvalError::Plan {
            record: self.plan.record.clone(),
            reason: reason.into(),
        }
    }
}

fn zero_primitive(kind: PrimitiveKind) -> Value {
    if kind.is_signed() {
        Value::Signed(0)
    } else {
        Value::Unsigned(0)
    }
}

/// Bits of `value` as a `kind`, range-checked.
#[allow(clippy::cast_sign_loss, reason = "two's complement bits of a range-checked value")]
fn encode_primitive(value: &Value, kind: PrimitiveKind) -> Result<u64, String> {
    let unused = 64 - 8 * kind.width();
    match value {
        Value::Unsigned(v) if !kind.is_signed() => {
            if unused == 0 || *v >> (64 - unused) == 0 {
                Ok(*v)
            } else {
                Err(format!("{v} does not fit in {kind}"))
            }
        }
        Value::Signed(v) if kind.is_signed() => {
            let min = i64::MIN >> unused;
            let max = i64::MAX >> unused;
            if (min..=max).contains(v) {
                Ok(*v as u64)
            } else {
                Err(format!("{v} does not fit in {kind}"))
            }
        }
        other => Err(format!("expected {kind}, found {}", other.kind())),
    }
}

#[allow(clippy::cast_possible_wrap, reason = "sign extension of decoded bits")]
fn decode_primitive(bits: u64, kind: PrimitiveKind) -> Value {
    if kind.is_signed() {
        let unused = 64 - 8 * kind.width();
        Value::Signed(((bits << unused) as i64) >> unused)
    } else {
        Value::Unsigned(bits)
    }
}

fn loop_count(count: &LoopCount, root: &Value, vars: &[usize]) -> Result<usize, EvalError> {
    match count {
        LoopCount::Fixed(n) => Ok(*n),
        LoopCount::LenOf(path) => array_len(resolve(root, path, vars)?, path),
    }
}

fn array_len(value: &Value, path: &Path) -> Result<usize, EvalError> {
    match value {
        Value::Array(items) => Ok(items.len()),
        other => Err(shape(
            path,
            path.len(),
            format!("expected array, found {}", other.kind()),
        )),
    }
}

fn resolve<'v>(root: &'v Value, path: &Path, vars: &[usize]) -> Result<&'v Value, EvalError> {
    let mut at = root;
    for (depth, step) in path.iter().enumerate() {
        at = match (step, at) {
            (Step::Field(name), Value::Record(fields)) => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v)
                .ok_or_else(|| shape(path, depth + 1, format!("missing field `{name}`")))?,
            (Step::Index(_) | Step::Var(_), Value::Array(items)) => {
                let index = step_index(step, vars);
                items.get(index).ok_or_else(|| {
                    shape(path, depth + 1, format!("index {index} out of {}", items.len()))
                })?
            }
            (_, other) => return Err(mismatch(path, depth, step, other)),
        };
    }
    Ok(at)
}

fn resolve_mut<'v>(
    root: &'v mut Value,
    path: &Path,
    vars: &[usize],
) -> Result<&'v mut Value, EvalError> {
    let mut at = root;
    for (depth, step) in path.iter().enumerate() {
        at = match (step, at) {
            (Step::Field(name), Value::Record(fields)) => fields
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v)
                .ok_or_else(|| shape(path, depth + 1, format!("missing field `{name}`")))?,
            (Step::Index(_) | Step::Var(_), Value::Array(items)) => {
                let index = step_index(step, vars);
                let len = items.len();
                items
                    .get_mut(index)
                    .ok_or_else(|| shape(path, depth + 1, format!("index {index} out of {len}")))?
            }
            (_, other) => return Err(mismatch(path, depth, step, other)),
        };
    }
    Ok(at)
}

fn sequence_mut<'v>(
    root: &'v mut Value,
    path: &Path,
    vars: &[usize],
) -> Result<&'v mut Vec<Value>, EvalError> {
    match resolve_mut(root, path, vars)? {
        Value::Array(items) => Ok(items),
        other => Err(shape(
            path,
            path.len(),
            format!("expected array, found {}", other.kind()),
        )),
    }
}

fn step_index(step: &Step, vars: &[usize]) -> usize {
    match step {
        Step::Index(index) => *index,
        Step::Var(var) => vars[var.depth()],
        Step::Field(_) => 0,
    }
}

fn mismatch(path: &Path, depth: usize, step: &Step, found: &Value) -> EvalError {
    let expected = match step {
        Step::Field(_) => "record",
        Step::Index(_) | Step::Var(_) => "array",
    };
    shape(
        path,
        depth,
        format!("expected {expected}, found {}", found.kind()),
    )
}

/// A shape error at the first `depth` steps of `path`.
fn shape(path: &Path, depth: usize, reason: String) -> EvalError {
    let mut rendered = String::from("self");
    for step in &path[..depth] {
        match step {
            Step::Field(name) => {
                rendered.push('.');
                rendered.push_str(name.as_str());
            }
            Step::Index(index) => rendered.push_str(&format!("[{index}]")),
            Step::Var(var) => rendered.push_str(&format!("[{}]", var.name())),
        }
    }
    EvalError::Shape {
        path: rendered,
        reason,
    }
}
