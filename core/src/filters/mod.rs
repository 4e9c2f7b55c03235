//! Filter operators
//!
//! Compiles string filter parameters (`age__gte=18`, `name__not__icontains=bot`)
//! into a store-agnostic [`Predicate`] tree.
//!
//! ```
//! use restfilter_core::filters::{FilterCompiler, parse_query_string};
//!
//! let compiler = FilterCompiler::default();
//! let requests = parse_query_string("age__gte=18&name__istartswith=a", compiler.registry()).unwrap();
//! let predicate = compiler.compile(&requests).unwrap();
//! assert_eq!(predicate.paths(), vec!["age", "name"]);
//! ```

pub mod coerce;
pub mod compiler;
pub mod error;
pub mod operators;
pub mod parser;
pub mod registry;
pub mod types;

pub use compiler::FilterCompiler;
pub use error::FilterError;
pub use operators::{Operator, OperatorKind};
pub use parser::{parse_pair, parse_param, parse_params, parse_query_string};
pub use registry::Registry;
pub use types::{Condition, FilterRequest, ObjectId, Predicate, RawClause, Relation, TypedValue};
