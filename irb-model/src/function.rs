//! Function Definitions
//!
//! A function definition owns its parameters, basic blocks, instructions
//! and symbol table. Blocks live in an arena addressed by [`BlockRef`];
//! a separate order vector gives their position, so blocks can be spliced
//! into the middle of a function without invalidating any handle.

use irb_common::{BlockRef, InstId};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::blocks::InstructionBlock;
use crate::instructions::Instruction;
use crate::symbols::SymbolTable;
use crate::types::{FunctionType, Type};
use crate::values::{FunctionParameter, FunctionRef};

/// Function in IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub ty: FunctionType,
    pub parameters: Vec<FunctionParameter>,
    blocks: Vec<InstructionBlock>,
    order: Vec<BlockRef>,
    instructions: Vec<Instruction>,
    symbols: SymbolTable,
    sealed: bool,
}

impl FunctionDefinition {
    /// Create an empty function shell
    pub fn new(name: impl Into<String>, ty: FunctionType) -> Self {
        Self {
            name: name.into(),
            ty,
            parameters: Vec::new(),
            blocks: Vec::new(),
            order: Vec::new(),
            instructions: Vec::new(),
            symbols: SymbolTable::new(),
            sealed: false,
        }
    }

    pub fn return_type(&self) -> &Type {
        &self.ty.return_type
    }

    /// Reference usable as a call target
    pub fn callable(&self) -> FunctionRef {
        FunctionRef::new(self.name.clone(), self.ty.clone())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn assert_open(&self) {
        assert!(!self.sealed, "function '{}' is already finished", self.name);
    }

    /// Append a formal parameter
    pub fn add_parameter(&mut self, ty: Type, name: impl Into<String>) -> FunctionParameter {
        self.assert_open();
        let param = FunctionParameter {
            index: self.parameters.len(),
            name: name.into(),
            ty,
        };
        self.parameters.push(param.clone());
        param
    }

    // Blocks

    fn allocate_block(&mut self, index: usize) -> BlockRef {
        let id = BlockRef(self.blocks.len() as u32);
        self.blocks.push(InstructionBlock::new(id, index));
        id
    }

    /// Make sure at least `count` blocks exist, appending unnamed placeholders
    pub fn reserve_blocks(&mut self, count: usize) {
        self.assert_open();
        while self.order.len() < count {
            let index = self.order.len();
            let id = self.allocate_block(index);
            self.order.push(id);
        }
    }

    /// Insert `count` unnamed blocks at position `at`. Every block that was
    /// at `at` or later moves back by `count`.
    pub fn splice_blocks(&mut self, at: usize, count: usize) -> Vec<BlockRef> {
        self.assert_open();
        let at = at.min(self.order.len());
        let inserted: Vec<BlockRef> = (0..count).map(|i| self.allocate_block(at + i)).collect();
        self.order.splice(at..at, inserted.iter().copied());

        for (index, id) in self.order.iter().enumerate().skip(at + count) {
            self.blocks[id.as_usize()].index = index;
        }
        debug!("{}: inserted {count} block(s) at {at}, {} block(s) total", self.name, self.order.len());
        inserted
    }

    pub fn block(&self, id: BlockRef) -> &InstructionBlock {
        &self.blocks[id.as_usize()]
    }

    pub fn block_mut(&mut self, id: BlockRef) -> &mut InstructionBlock {
        &mut self.blocks[id.as_usize()]
    }

    /// Block currently at position `index`
    pub fn block_at(&self, index: usize) -> Option<&InstructionBlock> {
        self.order.get(index).map(|id| self.block(*id))
    }

    pub fn block_ref_at(&self, index: usize) -> Option<BlockRef> {
        self.order.get(index).copied()
    }

    /// Current position of a block
    pub fn block_index(&self, id: BlockRef) -> usize {
        self.block(id).index
    }

    pub fn block_count(&self) -> usize {
        self.order.len()
    }

    /// Blocks in positional order
    pub fn blocks(&self) -> impl Iterator<Item = &InstructionBlock> {
        self.order.iter().map(|id| self.block(*id))
    }

    pub fn entry_block(&self) -> Option<&InstructionBlock> {
        self.block_at(0)
    }

    // Instructions and symbols

    /// Append an instruction to the end of `block`
    pub fn push_instruction(&mut self, block: BlockRef, instruction: Instruction) -> InstId {
        self.assert_open();
        let id = self.instructions.len();
        self.instructions.push(instruction);
        self.blocks[block.as_usize()].instructions.push(id);
        id
    }

    pub fn instruction(&self, id: InstId) -> &Instruction {
        &self.instructions[id]
    }

    pub fn instruction_mut(&mut self, id: InstId) -> &mut Instruction {
        &mut self.instructions[id]
    }

    /// Instructions of a block, in order
    pub fn block_instructions(&self, id: BlockRef) -> impl Iterator<Item = &Instruction> {
        self.block(id).instructions.iter().map(|inst| &self.instructions[*inst])
    }

    /// Every instruction, in creation order
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        self.assert_open();
        &mut self.symbols
    }

    /// Finish the definition. Panics if fewer or more parameters were
    /// created than the signature declares.
    pub fn exit_function(&mut self) {
        self.assert_open();
        assert_eq!(
            self.parameters.len(),
            self.ty.param_types.len(),
            "function '{}' declares {} parameter(s) but {} were created",
            self.name,
            self.ty.param_types.len(),
            self.parameters.len()
        );
        self.sealed = true;
        debug!(
            "finished function '{}': {} block(s), {} instruction(s), {} symbol(s)",
            self.name,
            self.order.len(),
            self.instructions.len(),
            self.symbols.len()
        );
    }
}
