use crate::{db::fetch::NavigablePath, value::Value};
use std::collections::BTreeMap;

static NULL: Value = Value::Null;

///
/// Row
///
/// One result row, keyed by `path.column`. A column absent from the row
/// reads as NULL.
///

#[derive(Clone, Debug, Default)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: &NavigablePath, column: &str, value: impl Into<Value>) -> Self {
        self.set(path, column, value);
        self
    }

    pub fn set(&mut self, path: &NavigablePath, column: &str, value: impl Into<Value>) {
        self.values.insert(key(path, column), value.into());
    }

    #[must_use]
    pub fn get(&self, path: &NavigablePath, column: &str) -> &Value {
        self.values.get(&key(path, column)).unwrap_or(&NULL)
    }

    /// Read a key spanning `columns`, collapsing single-column keys.
    #[must_use]
    pub fn read_key(&self, path: &NavigablePath, columns: &[&'static str]) -> Value {
        Value::from_parts(
            columns
                .iter()
                .map(|column| self.get(path, column).clone())
                .collect(),
        )
    }
}

fn key(path: &NavigablePath, column: &str) -> String {
    format!("{path}.{column}")
}
