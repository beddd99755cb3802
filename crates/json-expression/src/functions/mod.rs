//! The `_` utility namespace.
//!
//! Every function receives its arguments already evaluated. Iteratee
//! arguments are property paths (`"a.b"`) or omitted for the identity.

pub mod array;
pub mod number;
pub mod object;
pub mod predicate;
pub mod string;

use crate::types::{functions_to_map, FunctionDefinition, FunctionMap, JsValue};
use std::sync::Arc;

static UNDEFINED: JsValue = JsValue::Undefined;

/// Argument `i`, `undefined` when not passed.
pub(crate) fn arg(args: &[JsValue], i: usize) -> &JsValue {
    args.get(i).unwrap_or(&UNDEFINED)
}

/// All utility functions.
pub fn all_functions() -> Vec<Arc<FunctionDefinition>> {
    let mut funcs = Vec::new();
    funcs.extend(array::functions());
    funcs.extend(object::functions());
    funcs.extend(predicate::functions());
    funcs.extend(string::functions());
    funcs.extend(number::functions());
    funcs
}

/// Build the function map for the `_` namespace.
pub fn functions_map() -> FunctionMap {
    functions_to_map(all_functions())
}
