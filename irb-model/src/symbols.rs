//! Function-scoped symbol table
//!
//! Every operand an instruction refers to is registered here first; the
//! instruction then stores the operand's index. The table only grows.

use irb_common::SymbolIndex;
use serde::{Deserialize, Serialize};
use crate::values::Value;

/// Append-only ordered registry of values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: Vec<Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value and return its index. The same value may be
    /// registered any number of times; each registration gets a new index.
    pub fn append(&mut self, value: Value) -> SymbolIndex {
        self.symbols.push(value);
        self.symbols.len() - 1
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, index: SymbolIndex) -> Option<&Value> {
        self.symbols.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Constant;

    #[test]
    fn test_append_never_deduplicates() {
        let mut table = SymbolTable::new();
        let a = table.append(Value::from(Constant::i32(1)));
        let b = table.append(Value::from(Constant::i32(1)));
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0), table.get(1));
        assert!(table.get(2).is_none());
    }
}
