//! Instruction Builder
//!
//! Low-level construction of instructions inside one function definition.
//! Every operand is registered in the function's symbol table before the
//! instruction that uses it, and unnamed results get a numeric name from a
//! per-builder counter.

use irb_common::{BlockRef, InstId, SymbolIndex};
use irb_model::{
    AtomicOrdering, BinaryFlag, BinaryOperator, CastOperator, CompareOperator, Constant, DataLayout,
    FunctionDefinition, FunctionType, Instruction, InstructionValue, MemoryAccess,
    SynchronizationScope, Type, Value, DEFAULT_DATA_LAYOUT,
};
use log::{debug, trace};
use crate::BuildError;

/// Convert a byte alignment to its stored form: `log2(align) + 1`, 0 for none
pub fn encode_alignment(align: u64) -> u32 {
    assert!(
        align == 0 || align.is_power_of_two(),
        "alignment {align} is not a power of two"
    );
    if align == 0 {
        0
    } else {
        align.trailing_zeros() + 1
    }
}

/// Builder for the blocks and instructions of a single function
pub struct InstructionBuilder<'f> {
    function: &'f mut FunctionDefinition,
    layout: &'f DataLayout,
    current: BlockRef,
    counter: usize,
    arg_counter: usize,
    next_name: Option<String>,
}

impl<'f> InstructionBuilder<'f> {
    /// Start building into `function`, writing to its first block
    pub fn new(function: &'f mut FunctionDefinition) -> Self {
        Self::with_data_layout(function, &DEFAULT_DATA_LAYOUT)
    }

    pub fn with_data_layout(function: &'f mut FunctionDefinition, layout: &'f DataLayout) -> Self {
        function.reserve_blocks(1);
        let current = function
            .block_ref_at(0)
            .unwrap_or_else(|| panic!("function '{}' has no entry block", function.name));
        Self {
            function,
            layout,
            current,
            counter: 1,
            arg_counter: 1,
            next_name: None,
        }
    }

    pub fn function(&self) -> &FunctionDefinition {
        self.function
    }

    pub fn data_layout(&self) -> &DataLayout {
        self.layout
    }

    /// Number of the next parameter, starting at 1
    pub fn arg_counter(&self) -> usize {
        self.arg_counter
    }

    /// Append a parameter named `arg_<n>`
    pub fn create_parameter(&mut self, ty: Type) -> Value {
        let name = format!("arg_{}", self.arg_counter);
        self.arg_counter += 1;
        trace!("{}: parameter %{name}: {ty}", self.function.name);
        Value::Parameter(self.function.add_parameter(ty, name))
    }

    /// Give the next value-producing instruction an explicit name
    pub fn set_next_name(&mut self, name: impl Into<String>) {
        self.next_name = Some(name.into());
    }

    /// Finish the function. See [`FunctionDefinition::exit_function`].
    pub fn exit_function(self) {
        self.function.exit_function();
    }

    // Blocks

    pub fn current_block(&self) -> BlockRef {
        self.current
    }

    /// Current position of a block
    pub fn block_index(&self, block: BlockRef) -> usize {
        self.function.block_index(block)
    }

    fn block_ref(&mut self, index: usize) -> BlockRef {
        self.function.reserve_blocks(index + 1);
        match self.function.block_ref_at(index) {
            Some(block) => block,
            None => panic!("block {index} of '{}' was not created", self.function.name),
        }
    }

    /// Move to the following block, creating it if needed, and label it
    /// `label_<index>` unless it already has a name
    pub fn next_block(&mut self) -> BlockRef {
        let index = self.block_index(self.current) + 1;
        let block = self.block_ref(index);
        let entry = self.function.block_mut(block);
        if entry.name.is_none() {
            entry.name = Some(format!("label_{index}"));
        }
        self.current = block;
        debug!("{}: now writing block {index}", self.function.name);
        block
    }

    /// The block after the current one, created if needed
    pub fn get_next_block(&mut self) -> BlockRef {
        let index = self.block_index(self.current) + 1;
        self.block_ref(index)
    }

    /// The block at position `index`, creating every missing block up to it.
    ///
    /// Only positions up to the current block are stable: a later
    /// [`insert_blocks`](Self::insert_blocks) shifts every block after the
    /// current one. The returned handle itself stays valid, so capture
    /// handles before inserting blocks.
    pub fn get_block(&mut self, index: usize) -> BlockRef {
        self.block_ref(index)
    }

    /// Insert `count` blocks right after the current one
    pub fn insert_blocks(&mut self, count: usize) -> Vec<BlockRef> {
        let at = self.block_index(self.current) + 1;
        self.function.splice_blocks(at, count)
    }

    // Internals

    fn add_symbol(&mut self, value: &Value) -> SymbolIndex {
        let index = self.function.symbols_mut().append(value.clone());
        trace!("{}: symbol {index} = {value:?}", self.function.name);
        index
    }

    fn append(&mut self, mut instruction: Instruction) -> InstId {
        if let Some(result) = instruction.result_mut() {
            if result.is_empty() {
                *result = match self.next_name.take() {
                    Some(name) => name,
                    None => {
                        let name = self.counter.to_string();
                        self.counter += 1;
                        name
                    }
                };
            }
        }
        trace!(
            "{}: block {} += {} {}",
            self.function.name,
            self.block_index(self.current),
            instruction.opcode(),
            instruction.result().map(|r| format!("%{r}")).unwrap_or_default()
        );
        self.function.push_instruction(self.current, instruction)
    }

    fn append_value(&mut self, instruction: Instruction) -> Value {
        let id = self.append(instruction);
        let instruction = self.function.instruction(id);
        Value::Instruction(InstructionValue {
            id,
            name: instruction.result().unwrap_or_default().to_string(),
            ty: instruction.result_type().cloned().unwrap_or(Type::Void),
        })
    }

    fn expect_pointer(operation: &'static str, value: &Value) -> Result<Type, BuildError> {
        match value.ty() {
            Type::Pointer(pointee) => Ok(*pointee),
            found => Err(BuildError::NotAPointer { operation, found }),
        }
    }

    fn expect_same_type(operation: &'static str, lhs: &Value, rhs: &Value) -> Result<Type, BuildError> {
        let expected = lhs.ty();
        let found = rhs.ty();
        if expected != found {
            return Err(BuildError::TypeMismatch { operation, expected, found });
        }
        Ok(expected)
    }

    /// Function type of a call target.
    ///
    /// Functions are used directly; loaded values, parameters and inline
    /// assembly are unwrapped through any number of pointer layers. Results
    /// of any other instruction are rejected.
    fn callee_type(&self, target: &Value) -> Result<FunctionType, BuildError> {
        let mut ty = match target {
            Value::Function(func) => return Ok(func.ty.clone()),
            Value::Instruction(inst) => match self.function.instruction(inst.id) {
                Instruction::Load { .. } => target.ty(),
                _ => return Err(BuildError::UnsupportedCallTarget { ty: target.ty() }),
            },
            Value::Parameter(_) | Value::Constant(Constant::InlineAsm(_)) => target.ty(),
            Value::Constant(_) => return Err(BuildError::UnsupportedCallTarget { ty: target.ty() }),
        };
        while let Type::Pointer(pointee) = ty {
            ty = *pointee;
        }
        match ty {
            Type::Function(ft) => Ok(ft),
            ty => Err(BuildError::UnsupportedCallTarget { ty }),
        }
    }

    // Memory

    pub fn build_allocate(&mut self, ty: Type) -> Result<Value, BuildError> {
        self.build_allocate_array(ty, &Value::from(Constant::i32(1)))
    }

    /// Allocate `count` elements of `ty` on the stack
    pub fn build_allocate_array(&mut self, ty: Type, count: &Value) -> Result<Value, BuildError> {
        if !count.ty().is_integer() {
            return Err(BuildError::TypeMismatch {
                operation: "alloca",
                expected: Type::I32,
                found: count.ty(),
            });
        }
        let count = self.add_symbol(count);
        let align = encode_alignment(self.layout.alignment_of(&ty));
        Ok(self.append_value(Instruction::Allocate {
            result: String::new(),
            result_type: Type::pointer_to(ty.clone()),
            allocated_type: ty,
            count,
            align,
        }))
    }

    /// Plain load, aligned to the pointee's ABI alignment
    pub fn build_load(&mut self, source: &Value) -> Result<Value, BuildError> {
        let ty = Self::expect_pointer("load", source)?;
        let align = encode_alignment(self.layout.alignment_of(&ty));
        let source = self.add_symbol(source);
        Ok(self.append_value(Instruction::Load {
            result: String::new(),
            result_type: ty,
            source,
            access: MemoryAccess::aligned(align),
        }))
    }

    pub fn build_atomic_load(
        &mut self,
        source: &Value,
        align: u64,
        is_volatile: bool,
        ordering: AtomicOrdering,
        scope: SynchronizationScope,
    ) -> Result<Value, BuildError> {
        let ty = Self::expect_pointer("load", source)?;
        let access = MemoryAccess {
            align: encode_alignment(align),
            is_volatile,
            ordering,
            scope,
        };
        let source = self.add_symbol(source);
        Ok(self.append_value(Instruction::Load {
            result: String::new(),
            result_type: ty,
            source,
            access,
        }))
    }

    /// Store `source` through `destination` with an explicit byte alignment
    pub fn build_store(&mut self, destination: &Value, source: &Value, align: u64) -> Result<(), BuildError> {
        self.build_atomic_store(
            destination,
            source,
            align,
            false,
            AtomicOrdering::NotAtomic,
            SynchronizationScope::CrossThread,
        )
    }

    pub fn build_atomic_store(
        &mut self,
        destination: &Value,
        source: &Value,
        align: u64,
        is_volatile: bool,
        ordering: AtomicOrdering,
        scope: SynchronizationScope,
    ) -> Result<(), BuildError> {
        let pointee = Self::expect_pointer("store", destination)?;
        if pointee != source.ty() {
            return Err(BuildError::TypeMismatch {
                operation: "store",
                expected: pointee,
                found: source.ty(),
            });
        }
        let access = MemoryAccess {
            align: encode_alignment(align),
            is_volatile,
            ordering,
            scope,
        };
        let destination = self.add_symbol(destination);
        let source = self.add_symbol(source);
        self.append(Instruction::Store { destination, source, access });
        Ok(())
    }

    // Arithmetic

    pub fn build_binary(&mut self, operator: BinaryOperator, lhs: &Value, rhs: &Value) -> Result<Value, BuildError> {
        self.build_binary_with_flags(operator, &[], lhs, rhs)
    }

    pub fn build_binary_with_flags(
        &mut self,
        operator: BinaryOperator,
        flags: &[BinaryFlag],
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, BuildError> {
        let ty = Self::expect_same_type("binary operation", lhs, rhs)?;
        let lhs = self.add_symbol(lhs);
        let rhs = self.add_symbol(rhs);
        Ok(self.append_value(Instruction::BinaryOperation {
            result: String::new(),
            result_type: ty,
            operator,
            flags: flags.to_vec(),
            lhs,
            rhs,
        }))
    }

    /// Compare two operands of the same type; the result is `i1`, or a
    /// vector of `i1` for vector operands
    pub fn build_compare(&mut self, operator: CompareOperator, lhs: &Value, rhs: &Value) -> Result<Value, BuildError> {
        let ty = Self::expect_same_type("compare", lhs, rhs)?;
        let result_type = match ty {
            Type::Vector { len, .. } => Type::vector_of(len, Type::I1),
            _ => Type::I1,
        };
        let lhs = self.add_symbol(lhs);
        let rhs = self.add_symbol(rhs);
        Ok(self.append_value(Instruction::Compare {
            result: String::new(),
            result_type,
            operator,
            lhs,
            rhs,
        }))
    }

    pub fn build_cast(&mut self, operator: CastOperator, ty: Type, value: &Value) -> Result<Value, BuildError> {
        let value = self.add_symbol(value);
        Ok(self.append_value(Instruction::Cast {
            result: String::new(),
            result_type: ty,
            operator,
            value,
        }))
    }

    // Calls

    /// Call `target` with `arguments`. Returns `None` for void calls.
    pub fn build_call(&mut self, target: &Value, arguments: &[Value]) -> Result<Option<Value>, BuildError> {
        let ty = self.callee_type(target)?;
        let declared = ty.param_types.len();
        if arguments.len() < declared || (!ty.is_vararg && arguments.len() > declared) {
            return Err(BuildError::ArgumentCount {
                callee: target.name().unwrap_or("<constant>").to_string(),
                expected: declared,
                found: arguments.len(),
            });
        }
        for (param, arg) in ty.param_types.iter().zip(arguments) {
            if *param != arg.ty() {
                return Err(BuildError::TypeMismatch {
                    operation: "call",
                    expected: param.clone(),
                    found: arg.ty(),
                });
            }
        }

        let target = self.add_symbol(target);
        let arguments: Vec<SymbolIndex> = arguments.iter().map(|arg| self.add_symbol(arg)).collect();
        if ty.returns_void() {
            self.append(Instruction::VoidCall { target, arguments });
            Ok(None)
        } else {
            Ok(Some(self.append_value(Instruction::Call {
                result: String::new(),
                result_type: *ty.return_type,
                target,
                arguments,
            })))
        }
    }

    // Aggregates and vectors

    pub fn build_extract_element(&mut self, vector: &Value, index: u32) -> Result<Value, BuildError> {
        let ty = match vector.ty() {
            Type::Vector { element_type, .. } => *element_type,
            found => return Err(BuildError::NotAVector { operation: "extractelement", found }),
        };
        let vector = self.add_symbol(vector);
        let index = self.add_symbol(&Value::from(Constant::i32(i64::from(index))));
        Ok(self.append_value(Instruction::ExtractElement {
            result: String::new(),
            result_type: ty,
            vector,
            index,
        }))
    }

    pub fn build_insert_element(&mut self, vector: &Value, value: &Value, index: u32) -> Result<Value, BuildError> {
        let ty = vector.ty();
        let element = match &ty {
            Type::Vector { element_type, .. } => (**element_type).clone(),
            found => return Err(BuildError::NotAVector { operation: "insertelement", found: found.clone() }),
        };
        if element != value.ty() {
            return Err(BuildError::TypeMismatch {
                operation: "insertelement",
                expected: element,
                found: value.ty(),
            });
        }
        let vector = self.add_symbol(vector);
        let value = self.add_symbol(value);
        let index = self.add_symbol(&Value::from(Constant::i32(i64::from(index))));
        Ok(self.append_value(Instruction::InsertElement {
            result: String::new(),
            result_type: ty,
            vector,
            value,
            index,
        }))
    }

    fn aggregate_member(operation: &'static str, aggregate: &Type, index: u64) -> Result<Type, BuildError> {
        match aggregate {
            Type::Array { .. } | Type::Struct(_) => aggregate
                .aggregate_element(index)
                .cloned()
                .ok_or_else(|| BuildError::IndexOutOfRange { ty: aggregate.clone(), index }),
            found => Err(BuildError::NotAnAggregate { operation, found: found.clone() }),
        }
    }

    pub fn build_extract_value(&mut self, aggregate: &Value, index: u64) -> Result<Value, BuildError> {
        let ty = Self::aggregate_member("extractvalue", &aggregate.ty(), index)?;
        let aggregate = self.add_symbol(aggregate);
        Ok(self.append_value(Instruction::ExtractValue {
            result: String::new(),
            result_type: ty,
            aggregate,
            index,
        }))
    }

    pub fn build_insert_value(&mut self, aggregate: &Value, value: &Value, index: u64) -> Result<Value, BuildError> {
        let ty = aggregate.ty();
        let member = Self::aggregate_member("insertvalue", &ty, index)?;
        if member != value.ty() {
            return Err(BuildError::TypeMismatch {
                operation: "insertvalue",
                expected: member,
                found: value.ty(),
            });
        }
        let aggregate = self.add_symbol(aggregate);
        let value = self.add_symbol(value);
        Ok(self.append_value(Instruction::InsertValue {
            result: String::new(),
            result_type: ty,
            aggregate,
            value,
            index,
        }))
    }

    /// Address computation. The result type walks the base type through
    /// every index and wraps the final type in a pointer.
    pub fn build_get_element_pointer(&mut self, base: &Value, indices: &[Value], inbounds: bool) -> Result<Value, BuildError> {
        Self::expect_pointer("getelementptr", base)?;
        let mut ty = base.ty();
        for index in indices {
            ty = match ty {
                Type::Vector { element_type, .. } | Type::Array { element_type, .. } => *element_type,
                Type::Pointer(pointee) => *pointee,
                Type::Struct(ref st) => {
                    let field = index
                        .as_constant()
                        .and_then(Constant::as_integer)
                        .ok_or_else(|| BuildError::NonConstantStructIndex { ty: ty.clone() })?;
                    usize::try_from(field)
                        .ok()
                        .and_then(|i| st.fields.get(i))
                        .cloned()
                        .ok_or_else(|| BuildError::IndexOutOfRange { ty: ty.clone(), index: field as u64 })?
                }
                other => other,
            };
        }

        let base = self.add_symbol(base);
        let indices: Vec<SymbolIndex> = indices.iter().map(|index| self.add_symbol(index)).collect();
        Ok(self.append_value(Instruction::GetElementPointer {
            result: String::new(),
            result_type: Type::pointer_to(ty),
            base,
            indices,
            inbounds,
        }))
    }

    pub fn build_select(&mut self, condition: &Value, true_value: &Value, false_value: &Value) -> Result<Value, BuildError> {
        let condition_ty = condition.ty();
        let valid = match &condition_ty {
            Type::Integer(1) => true,
            Type::Vector { element_type, .. } => **element_type == Type::I1,
            _ => false,
        };
        if !valid {
            return Err(BuildError::InvalidCondition { operation: "select", found: condition_ty });
        }
        let ty = Self::expect_same_type("select", true_value, false_value)?;
        let condition = self.add_symbol(condition);
        let true_value = self.add_symbol(true_value);
        let false_value = self.add_symbol(false_value);
        Ok(self.append_value(Instruction::Select {
            result: String::new(),
            result_type: ty,
            condition,
            true_value,
            false_value,
        }))
    }

    /// Shuffle two vectors of the same type; the result has one lane per mask element
    pub fn build_shuffle_vector(&mut self, vector1: &Value, vector2: &Value, mask: &Value) -> Result<Value, BuildError> {
        let ty = Self::expect_same_type("shufflevector", vector1, vector2)?;
        let element = match ty {
            Type::Vector { element_type, .. } => *element_type,
            found => return Err(BuildError::NotAVector { operation: "shufflevector", found }),
        };
        let lanes = match mask.ty() {
            Type::Vector { len, ref element_type } if **element_type == Type::I32 => len,
            found => {
                return Err(BuildError::TypeMismatch {
                    operation: "shufflevector mask",
                    expected: Type::vector_of(1, Type::I32),
                    found,
                })
            }
        };
        let vector1 = self.add_symbol(vector1);
        let vector2 = self.add_symbol(vector2);
        let mask = self.add_symbol(mask);
        Ok(self.append_value(Instruction::ShuffleVector {
            result: String::new(),
            result_type: Type::vector_of(lanes, element),
            vector1,
            vector2,
            mask,
        }))
    }

    /// Phi node with one `(value, predecessor)` pair per incoming edge
    pub fn build_phi(&mut self, ty: Type, incoming: &[(Value, BlockRef)]) -> Result<Value, BuildError> {
        if let Some((value, _)) = incoming.iter().find(|(value, _)| value.ty() != ty) {
            return Err(BuildError::TypeMismatch {
                operation: "phi",
                expected: ty,
                found: value.ty(),
            });
        }
        let incoming = incoming
            .iter()
            .map(|(value, block)| (self.add_symbol(value), *block))
            .collect();
        Ok(self.append_value(Instruction::Phi {
            result: String::new(),
            result_type: ty,
            incoming,
        }))
    }

    // Terminators

    pub fn build_branch(&mut self, target: BlockRef) {
        self.append(Instruction::Branch { successor: target });
    }

    pub fn build_cond_branch(&mut self, condition: &Value, if_block: BlockRef, else_block: BlockRef) -> Result<(), BuildError> {
        if condition.ty() != Type::I1 {
            return Err(BuildError::InvalidCondition { operation: "br", found: condition.ty() });
        }
        let condition = self.add_symbol(condition);
        self.append(Instruction::ConditionalBranch {
            condition,
            true_successor: if_block,
            false_successor: else_block,
        });
        Ok(())
    }

    pub fn build_indirect_branch(&mut self, address: &Value, successors: &[BlockRef]) -> Result<(), BuildError> {
        Self::expect_pointer("indirectbr", address)?;
        let address = self.add_symbol(address);
        self.append(Instruction::IndirectBranch {
            address,
            successors: successors.to_vec(),
        });
        Ok(())
    }

    /// Switch over symbol case values
    pub fn build_switch(&mut self, condition: &Value, default_block: BlockRef, cases: &[(Value, BlockRef)]) -> Result<(), BuildError> {
        let ty = condition.ty();
        if !ty.is_integer() {
            return Err(BuildError::TypeMismatch {
                operation: "switch",
                expected: Type::I32,
                found: ty,
            });
        }
        if let Some((value, _)) = cases.iter().find(|(value, _)| value.ty() != ty) {
            return Err(BuildError::TypeMismatch {
                operation: "switch case",
                expected: ty,
                found: value.ty(),
            });
        }
        let condition = self.add_symbol(condition);
        let cases = cases
            .iter()
            .map(|(value, block)| (self.add_symbol(value), *block))
            .collect();
        self.append(Instruction::Switch { condition, default_block, cases });
        Ok(())
    }

    /// Switch in the old encoding, with literal case values
    pub fn build_switch_old(&mut self, condition: &Value, default_block: BlockRef, cases: &[(i64, BlockRef)]) -> Result<(), BuildError> {
        if !condition.ty().is_integer() {
            return Err(BuildError::TypeMismatch {
                operation: "switch",
                expected: Type::I32,
                found: condition.ty(),
            });
        }
        let condition = self.add_symbol(condition);
        self.append(Instruction::SwitchOld {
            condition,
            default_block,
            cases: cases.to_vec(),
        });
        Ok(())
    }

    pub fn build_return(&mut self, value: &Value) {
        let value = self.add_symbol(value);
        self.append(Instruction::Return { value: Some(value) });
    }

    pub fn build_return_void(&mut self) {
        self.append(Instruction::Return { value: None });
    }

    pub fn build_unreachable(&mut self) {
        self.append(Instruction::Unreachable);
    }
}
