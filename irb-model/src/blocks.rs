//! Basic Block Management
//!
//! Defines basic blocks - sequences of instructions with single entry/exit points.

use irb_common::{BlockRef, InstId};
use serde::{Deserialize, Serialize};

/// Basic block of a function definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionBlock {
    /// Stable handle, never changes
    pub id: BlockRef,
    /// Current position in the function's block order
    pub index: usize,
    /// Label; `None` for implicitly named blocks
    pub name: Option<String>,
    pub instructions: Vec<InstId>,
}

impl InstructionBlock {
    pub fn new(id: BlockRef, index: usize) -> Self {
        Self {
            id,
            index,
            name: None,
            instructions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}
