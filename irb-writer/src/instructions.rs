//! Instruction lines
//!
//! One function per family of instructions; each returns the line without
//! its indentation. Operands are resolved through the function's symbol
//! table, block targets through its block arena.

use irb_common::{BlockRef, SymbolIndex};
use irb_model::instructions::decode_alignment;
use irb_model::{Constant, FunctionDefinition, FunctionType, Instruction, MemoryAccess, SynchronizationScope, Type, Value};
use crate::format::{self, local};
use crate::{DialectVersion, WriteError};

pub(crate) const INDENT: &str = "  ";

/// Formats the instructions of one function
pub(crate) struct InstructionPrinter<'a> {
    function: &'a FunctionDefinition,
    version: DialectVersion,
}

impl<'a> InstructionPrinter<'a> {
    pub fn new(function: &'a FunctionDefinition, version: DialectVersion) -> Self {
        Self { function, version }
    }

    fn symbol(&self, index: SymbolIndex) -> Result<&'a Value, WriteError> {
        self.function.symbols().get(index).ok_or_else(|| WriteError::UnknownSymbol {
            function: self.function.name.clone(),
            index,
        })
    }

    fn value(&self, index: SymbolIndex) -> Result<String, WriteError> {
        format::value(self.symbol(index)?, self.version)
    }

    fn typed(&self, index: SymbolIndex) -> Result<String, WriteError> {
        format::typed_value(self.symbol(index)?, self.version)
    }

    fn operand_type(&self, index: SymbolIndex) -> Result<Type, WriteError> {
        Ok(format::operand_type(self.symbol(index)?))
    }

    /// `%label_N`, or `%N` for an implicitly named block
    pub fn block_name(&self, block: BlockRef) -> String {
        let block = self.function.block(block);
        match &block.name {
            Some(name) => local(name),
            None => format!("%{}", block.index),
        }
    }

    fn label(&self, block: BlockRef) -> String {
        format!("label {}", self.block_name(block))
    }

    /// `, align N` when an alignment is set
    fn alignment(align: u32) -> String {
        decode_alignment(align).map(|bytes| format!(", align {bytes}")).unwrap_or_default()
    }

    /// ` [singlethread] <ordering>` for atomic accesses
    fn atomic_suffix(access: &MemoryAccess) -> String {
        if !access.ordering.is_atomic() {
            return String::new();
        }
        let scope = if access.scope == SynchronizationScope::SingleThread { " singlethread" } else { "" };
        format!("{scope} {}", access.ordering)
    }

    fn atomic_prefix(access: &MemoryAccess) -> &'static str {
        match (access.ordering.is_atomic(), access.is_volatile) {
            (true, true) => "atomic volatile ",
            (true, false) => "atomic ",
            (false, true) => "volatile ",
            (false, false) => "",
        }
    }

    pub fn instruction(&self, instruction: &Instruction) -> Result<String, WriteError> {
        let line = match instruction {
            Instruction::Allocate { result, allocated_type, count, align, .. } => {
                let mut line = format!("{} = alloca {allocated_type}", local(result));
                let single = matches!(
                    self.symbol(*count)?,
                    Value::Constant(Constant::Integer { value: 1, .. })
                );
                if !single {
                    line.push_str(&format!(", {}", self.typed(*count)?));
                }
                line.push_str(&Self::alignment(*align));
                line
            }

            Instruction::Load { result, result_type, source, access } => {
                let mut line = format!("{} = load {}", local(result), Self::atomic_prefix(access));
                if self.version.explicit_pointee_types() {
                    line.push_str(&format!("{result_type}, "));
                }
                line.push_str(&self.typed(*source)?);
                line.push_str(&Self::atomic_suffix(access));
                line.push_str(&Self::alignment(access.align));
                line
            }

            Instruction::Store { destination, source, access } => {
                let pointer = self.operand_type(*destination)?;
                let pointee = pointer
                    .pointee()
                    .ok_or_else(|| WriteError::not_implemented(format!("store through {pointer}")))?;
                format!(
                    "store {}{pointee} {}, {pointer} {}{}{}",
                    Self::atomic_prefix(access),
                    self.value(*source)?,
                    self.value(*destination)?,
                    Self::atomic_suffix(access),
                    Self::alignment(access.align)
                )
            }

            Instruction::BinaryOperation { result, result_type, operator, flags, lhs, rhs } => {
                let flags: String = flags.iter().map(|flag| format!("{flag} ")).collect();
                format!(
                    "{} = {operator} {flags}{result_type} {}, {}",
                    local(result),
                    self.value(*lhs)?,
                    self.value(*rhs)?
                )
            }

            Instruction::Compare { result, operator, lhs, rhs, .. } => {
                let opcode = if operator.is_floating_point() { "fcmp" } else { "icmp" };
                format!(
                    "{} = {opcode} {operator} {}, {}",
                    local(result),
                    self.typed(*lhs)?,
                    self.value(*rhs)?
                )
            }

            Instruction::Cast { result, result_type, operator, value } => {
                format!("{} = {operator} {} to {result_type}", local(result), self.typed(*value)?)
            }

            Instruction::Call { result, target, arguments, .. } => {
                format!("{} = {}", local(result), self.call(*target, arguments)?)
            }

            Instruction::VoidCall { target, arguments } => self.call(*target, arguments)?,

            Instruction::Branch { successor } => format!("br {}", self.label(*successor)),

            Instruction::ConditionalBranch { condition, true_successor, false_successor } => format!(
                "br {}, {}, {}",
                self.typed(*condition)?,
                self.label(*true_successor),
                self.label(*false_successor)
            ),

            Instruction::IndirectBranch { address, successors } => {
                let labels: Vec<String> = successors.iter().map(|block| self.label(*block)).collect();
                format!("indirectbr {}, [ {} ]", self.typed(*address)?, labels.join(", "))
            }

            Instruction::Switch { condition, default_block, cases } => {
                let cases = cases
                    .iter()
                    .map(|(value, block)| Ok(format!("{}, {}", self.typed(*value)?, self.label(*block))))
                    .collect::<Result<Vec<_>, WriteError>>()?;
                self.switch(*condition, *default_block, cases)?
            }

            Instruction::SwitchOld { condition, default_block, cases } => {
                let ty = self.operand_type(*condition)?;
                let cases = cases
                    .iter()
                    .map(|(value, block)| format!("{ty} {value}, {}", self.label(*block)))
                    .collect();
                self.switch(*condition, *default_block, cases)?
            }

            Instruction::Phi { result, result_type, incoming } => {
                let incoming = incoming
                    .iter()
                    .map(|(value, block)| Ok(format!("[ {}, {} ]", self.value(*value)?, self.block_name(*block))))
                    .collect::<Result<Vec<_>, WriteError>>()?;
                format!("{} = phi {result_type} {}", local(result), incoming.join(", "))
            }

            Instruction::GetElementPointer { result, base, indices, inbounds, .. } => {
                let mut line = format!("{} = getelementptr ", local(result));
                if *inbounds {
                    line.push_str("inbounds ");
                }
                if self.version.explicit_pointee_types() {
                    let pointer = self.operand_type(*base)?;
                    let pointee = pointer
                        .pointee()
                        .ok_or_else(|| WriteError::not_implemented(format!("getelementptr on {pointer}")))?;
                    line.push_str(&format!("{pointee}, "));
                }
                line.push_str(&self.typed(*base)?);
                for index in indices {
                    line.push_str(", ");
                    line.push_str(&self.typed(*index)?);
                }
                line
            }

            Instruction::ExtractElement { result, vector, index, .. } => format!(
                "{} = extractelement {}, {}",
                local(result),
                self.typed(*vector)?,
                self.typed(*index)?
            ),

            Instruction::InsertElement { result, vector, value, index, .. } => format!(
                "{} = insertelement {}, {}, {}",
                local(result),
                self.typed(*vector)?,
                self.typed(*value)?,
                self.typed(*index)?
            ),

            Instruction::ExtractValue { result, aggregate, index, .. } => {
                format!("{} = extractvalue {}, {index}", local(result), self.typed(*aggregate)?)
            }

            Instruction::InsertValue { result, aggregate, value, index, .. } => format!(
                "{} = insertvalue {}, {}, {index}",
                local(result),
                self.typed(*aggregate)?,
                self.typed(*value)?
            ),

            Instruction::Select { result, condition, true_value, false_value, .. } => format!(
                "{} = select {}, {}, {}",
                local(result),
                self.typed(*condition)?,
                self.typed(*true_value)?,
                self.typed(*false_value)?
            ),

            Instruction::ShuffleVector { result, vector1, vector2, mask, .. } => format!(
                "{} = shufflevector {}, {}, {}",
                local(result),
                self.typed(*vector1)?,
                self.typed(*vector2)?,
                self.typed(*mask)?
            ),

            Instruction::Return { value: Some(value) } => format!("ret {}", self.typed(*value)?),
            Instruction::Return { value: None } => "ret void".to_string(),
            Instruction::Unreachable => "unreachable".to_string(),
        };
        Ok(line)
    }

    /// `switch <ty> <cond>, label <default> [ <case>\n    <case> ]`
    fn switch(&self, condition: SymbolIndex, default_block: BlockRef, cases: Vec<String>) -> Result<String, WriteError> {
        let separator = format!("\n{INDENT}{INDENT}");
        Ok(format!(
            "switch {}, {} [ {} ]",
            self.typed(condition)?,
            self.label(default_block),
            cases.join(&separator)
        ))
    }

    /// Function type of a call target, unwrapping pointers
    fn callee_type(&self, target: &Value) -> Result<FunctionType, WriteError> {
        let mut ty = target.ty();
        while let Type::Pointer(pointee) = ty {
            ty = *pointee;
        }
        match ty {
            Type::Function(ft) => Ok(ft),
            other => Err(WriteError::not_implemented(format!("call through {other}"))),
        }
    }

    /// `call <ret> [<params>[*]] <callee>(<args>)`
    fn call(&self, target: SymbolIndex, arguments: &[SymbolIndex]) -> Result<String, WriteError> {
        let callee = self.symbol(target)?;
        let ty = self.callee_type(callee)?;
        let mut line = format!("call {}", ty.return_type);

        let returns_function_pointer = matches!(
            ty.return_type.pointee(),
            Some(Type::Function(_))
        );
        if ty.is_vararg || returns_function_pointer {
            line.push(' ');
            line.push_str(&formal_parameters(&ty));
            if self.version.callee_type_is_pointer() {
                line.push('*');
            }
        }

        line.push(' ');
        line.push_str(&format::value(callee, self.version)?);
        let arguments = arguments
            .iter()
            .map(|arg| self.typed(*arg))
            .collect::<Result<Vec<_>, WriteError>>()?;
        line.push_str(&format!("({})", arguments.join(", ")));
        Ok(line)
    }
}

/// `(i32, i8*, ...)`
pub(crate) fn formal_parameters(ty: &FunctionType) -> String {
    let mut params: Vec<String> = ty.param_types.iter().map(Type::to_string).collect();
    if ty.is_vararg {
        params.push("...".to_string());
    }
    format!("({})", params.join(", "))
}
