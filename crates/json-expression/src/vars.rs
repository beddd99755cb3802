use crate::error::ExprError;
use crate::types::JsValue;
use serde_json::Value;
use std::collections::HashMap;

/// Name the current item is bound under.
pub const ITEM: &str = "it";
/// Name the current index or property name is bound under.
pub const KEY: &str = "key";
/// Name of the per-item output accumulator.
pub const OUT: &str = "out";
/// Name of the utility function namespace.
pub const NAMESPACE: &str = "_";

/// Variable bindings visible to a single evaluation.
///
/// Built fresh for every item; assignments made by an expression stay
/// inside this store.
#[derive(Debug, Clone, Default)]
pub struct Vars {
    vars: HashMap<String, JsValue>,
}

impl Vars {
    /// Bindings with `it` set to `item`.
    pub fn new(item: Value) -> Self {
        let mut vars = HashMap::new();
        vars.insert(ITEM.to_string(), JsValue::Json(item));
        Vars { vars }
    }

    /// Binds `key`.
    pub fn with_key(mut self, key: Value) -> Self {
        self.vars.insert(KEY.to_string(), JsValue::Json(key));
        self
    }

    /// Binds `out` to an empty object.
    pub fn with_accumulator(mut self) -> Self {
        self.vars.insert(
            OUT.to_string(),
            JsValue::Json(Value::Object(serde_json::Map::new())),
        );
        self
    }

    /// Returns the value bound to `name`, `None` when unbound.
    pub fn get(&self, name: &str) -> Option<&JsValue> {
        self.vars.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut JsValue> {
        self.vars.get_mut(name)
    }

    /// Binds `name`. The namespace name cannot be rebound.
    pub fn set(&mut self, name: &str, value: JsValue) -> Result<(), ExprError> {
        if name.is_empty() || name == NAMESPACE {
            return Err(ExprError::InvalidAssignment);
        }
        self.vars.insert(name.to_string(), value);
        Ok(())
    }

    /// Removes a binding, returning its value.
    pub fn take(&mut self, name: &str) -> Option<JsValue> {
        self.vars.remove(name)
    }
}
