//! Chain expression-driven operations over a JSON document.
//!
//! A pipeline is an ordered list of [`OperationDescriptor`]s, each naming an
//! operation (`findall`, `sortby`, `transform`, ...) and optionally carrying
//! an expression in the `json-expression` language. The whole pipeline is
//! compiled before anything runs, then folded over the input value.
//!
//! # Example
//!
//! ```
//! use jsonop::{process, OperationDescriptor};
//! use serde_json::json;
//!
//! let ops = [
//!     OperationDescriptor::new("findall", Some("it.age > 18")),
//!     OperationDescriptor::new("count", None),
//! ];
//! let result = process(r#"[{"age":15},{"age":20},{"age":30}]"#, &ops, false).unwrap();
//!
//! assert_eq!(result, json!(2));
//! ```

pub mod cli;
pub mod error;
pub mod operations;
pub mod pipeline;
pub mod types;

pub use error::PipelineError;
pub use operations::operations_map;
pub use pipeline::{process, Pipeline};
pub use types::{ArgSpec, OpCtx, OperationDefinition, OperationDescriptor, OperationMap};
