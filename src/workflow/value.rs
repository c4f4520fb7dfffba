// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::model::Model;
use crate::results::Results;
use serde_json::Value as JsonValue;

/// Data passed between tasks.
///
/// Values are owned and cloned when a task's output feeds several
/// successors, so a task may freely mutate what it receives.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Json(JsonValue),
    Model(Model),
    Results(Results),
}

impl Value {
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Value::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<Model> {
        match self {
            Value::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_results(self) -> Option<Results> {
        match self {
            Value::Results(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Every model directly held by this value: itself, or the models of a
    /// list. Nested lists are not searched.
    pub fn models(&self) -> Vec<&Model> {
        match self {
            Value::Model(m) => vec![m],
            Value::List(items) => items.iter().filter_map(Value::as_model).collect(),
            _ => Vec::new(),
        }
    }

    /// JSON rendering used in run metadata. Models render as their display
    /// string, results as their full record.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Unit => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => JsonValue::from(*f),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Json(j) => j.clone(),
            Value::Model(m) => JsonValue::String(m.to_string()),
            Value::Results(r) => serde_json::to_value(r).unwrap_or(JsonValue::Null),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<JsonValue> for Value {
    fn from(j: JsonValue) -> Self {
        Value::Json(j)
    }
}

impl From<Model> for Value {
    fn from(m: Model) -> Self {
        Value::Model(m)
    }
}

impl From<Results> for Value {
    fn from(r: Results) -> Self {
        Value::Results(r)
    }
}

impl From<Vec<Model>> for Value {
    fn from(models: Vec<Model>) -> Self {
        Value::list(models)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Unit, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_are_collected_from_lists() {
        let v = Value::list(vec![
            Value::from(Model::new("a", "")),
            Value::Int(3),
            Value::from(Model::new("b", "")),
        ]);
        let names: Vec<_> = v.models().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn json_rendering() {
        let v = Value::list(vec![Value::Unit, Value::from("x"), Value::from(Model::new("m", ""))]);
        assert_eq!(v.to_json(), serde_json::json!([null, "x", "<Model m>"]));
        assert_eq!(Value::from(None::<i64>), Value::Unit);
        assert_eq!(Value::Int(2).as_float(), Some(2.0));
    }
}
