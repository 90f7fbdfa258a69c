//! # Call Arguments
//!
//! A snapshot of one invocation: ordered positional values plus a keyword
//! mapping with unique keys. Validation reads it; targets consume it.

use std::collections::BTreeMap;

use crate::value::Value;

/// Positional and keyword arguments of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArguments {
    /// Positional values, index 0 first.
    pub positional: Vec<Value>,
    /// Keyword values by parameter name.
    pub keyword: BTreeMap<String, Value>,
}

impl CallArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments with only positional values.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keyword: BTreeMap::new(),
        }
    }

    /// Append one positional value.
    pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set one keyword value, replacing any previous value of that name.
    pub fn with_keyword(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Prepend a receiver as positional element 0.
    pub fn with_receiver(mut self, receiver: Value) -> Self {
        self.positional.insert(0, receiver);
        self
    }

    pub fn get_positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn get_keyword(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }

    /// Total number of supplied values.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receiver_goes_first() {
        let args = CallArguments::positional([Value::from(1), Value::from(2)])
            .with_keyword("k", "v")
            .with_receiver(Value::from("self"));
        assert_eq!(args.positional.len(), 3);
        assert_eq!(args.get_positional(0), Some(&Value::from("self")));
        assert_eq!(args.get_positional(2), Some(&Value::from(2)));
        assert_eq!(args.get_keyword("k"), Some(&Value::from("v")));
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn keywords_are_unique() {
        let args = CallArguments::new()
            .with_keyword("x", 1)
            .with_keyword("x", 2);
        assert_eq!(args.keyword.len(), 1);
        assert_eq!(args.get_keyword("x"), Some(&Value::from(2)));
        assert!(!args.is_empty());
        assert!(CallArguments::new().is_empty());
    }
}
