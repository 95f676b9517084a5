//! Identifiers shared across the IR builder crates
//! 
//! Every identifier here is a plain index into a function-scoped table.
//! None of them is meaningful outside the function that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a value in a function's symbol table
pub type SymbolIndex = usize;

/// Index of an instruction in a function's instruction arena
pub type InstId = usize;

/// Stable handle of a basic block.
///
/// Unlike a block's positional index, a handle survives block insertion:
/// it always names the same block, wherever that block currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockRef(pub u32);

impl BlockRef {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}
