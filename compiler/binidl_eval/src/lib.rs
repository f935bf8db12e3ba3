//! Reference evaluator for binidl codec plans.
//!
//! [`Interpreter`] executes the marshal and unmarshal procedures that
//! `binidl_codegen` synthesizes, against dynamically typed [`Value`]s
//! instead of compiled structs. It shares the plans and the runtime helpers
//! (`binidl_rt::put_uint`, `get_uint`, `write_len`, `read_len`,
//! `ByteReader`) with generated code, so wire-level behavior can be tested
//! for any graph without a build step.
//!
//! ```
//! use binidl_codegen::GeneratorConfig;
//! use binidl_eval::{Interpreter, Value};
//! use binidl_ir::TypeGraph;
//!
//! let graph = TypeGraph::builder()
//!     .record("Sliced", |r| r.vec("s", "int8"))
//!     .build()
//!     .unwrap();
//! let interp = Interpreter::new(&graph, &GeneratorConfig::default()).unwrap();
//! let value = Value::record([("s", Value::signed_array([2, 3, 4]))]);
//! assert_eq!(interp.marshal_to_vec("Sliced", &value).unwrap(), [6, 2, 3, 4]);
//! ```

mod error;
mod interp;
mod value;

pub use error::EvalError;
pub use interp::Interpreter;
pub use value::Value;
