//! Unit tests for the instruction builder

use super::*;
use irb_model::{
    BinaryOperator, CastOperator, CompareOperator, Constant, FloatKind, FunctionDefinition, FunctionRef, FunctionType,
    InlineAsmConstant, Instruction, StructType, Type, Value,
};
use pretty_assertions::assert_eq;

fn shell(ret: Type, params: Vec<Type>) -> FunctionDefinition {
    FunctionDefinition::new("test", FunctionType::new(ret, params, false))
}

fn i32c(v: i64) -> Value {
    Value::from(Constant::i32(v))
}

#[test]
fn test_encode_alignment() {
    assert_eq!(encode_alignment(0), 0);
    assert_eq!(encode_alignment(1), 1);
    assert_eq!(encode_alignment(4), 3);
    assert_eq!(encode_alignment(16), 5);
}

#[test]
#[should_panic(expected = "not a power of two")]
fn test_encode_alignment_rejects_non_power_of_two() {
    encode_alignment(12);
}

#[test]
fn test_parameters_and_result_names() {
    let mut function = shell(Type::I32, vec![Type::I32, Type::I32]);
    let mut builder = InstructionBuilder::new(&mut function);
    let a = builder.create_parameter(Type::I32);
    let b = builder.create_parameter(Type::I32);
    assert_eq!(a.name(), Some("arg_1"));
    assert_eq!(b.name(), Some("arg_2"));

    let sum = builder.build_binary(BinaryOperator::Add, &a, &b).unwrap();
    builder.set_next_name("product");
    let product = builder.build_binary(BinaryOperator::Mul, &sum, &b).unwrap();
    let diff = builder.build_binary(BinaryOperator::Sub, &product, &a).unwrap();
    builder.build_return(&diff);
    builder.exit_function();

    assert_eq!(sum.name(), Some("1"));
    assert_eq!(product.name(), Some("product"));
    assert_eq!(diff.name(), Some("2"));
}

#[test]
fn test_symbols_are_appended_per_use() {
    let mut function = shell(Type::I32, vec![Type::I32]);
    let mut builder = InstructionBuilder::new(&mut function);
    let a = builder.create_parameter(Type::I32);
    let x = builder.build_binary(BinaryOperator::Add, &a, &i32c(1)).unwrap();
    builder.build_binary(BinaryOperator::Add, &x, &i32c(1)).unwrap();
    builder.build_return(&x);
    builder.exit_function();

    // a, 1, x, 1, x
    let symbols = function.symbols();
    assert_eq!(symbols.len(), 5);
    assert_eq!(symbols.get(1), symbols.get(3));

    let entry = function.block_ref_at(0).unwrap();
    let operands: Vec<(usize, usize)> = function
        .block_instructions(entry)
        .filter_map(|inst| match inst {
            Instruction::BinaryOperation { lhs, rhs, .. } => Some((*lhs, *rhs)),
            _ => None,
        })
        .collect();
    assert_eq!(operands, vec![(0, 1), (2, 3)]);
}

#[test]
fn test_next_block_names_and_creates() {
    let mut function = shell(Type::Void, vec![]);
    let mut builder = InstructionBuilder::new(&mut function);
    let entry = builder.current_block();
    let third = builder.get_block(2);
    assert_eq!(builder.block_index(third), 2);

    let second = builder.next_block();
    assert_eq!(builder.block_index(second), 1);
    assert_eq!(builder.current_block(), second);
    builder.build_branch(third);
    assert_eq!(builder.next_block(), third);
    builder.build_return_void();

    let fourth = builder.get_next_block();
    assert_eq!(builder.block_index(fourth), 3);
    drop(builder);

    assert_eq!(function.block(entry).name, None);
    assert_eq!(function.block(second).name.as_deref(), Some("label_1"));
    assert_eq!(function.block(third).name.as_deref(), Some("label_2"));
    assert_eq!(function.block(fourth).name, None);
}

#[test]
fn test_insert_blocks_shifts_following_blocks() {
    let mut function = shell(Type::Void, vec![]);
    let mut builder = InstructionBuilder::new(&mut function);
    let later = builder.get_block(2);
    let next = builder.get_block(1);

    let inserted = builder.insert_blocks(3);
    assert_eq!(inserted.len(), 3);
    assert_eq!(builder.block_index(inserted[0]), 1);
    assert_eq!(builder.block_index(next), 4);
    assert_eq!(builder.block_index(later), 5);
    assert_eq!(builder.block_index(builder.current_block()), 0);

    // positional lookups see the new order
    assert_eq!(builder.get_block(1), inserted[0]);
    assert_eq!(builder.next_block(), inserted[0]);
}

#[test]
fn test_load_store_alloca() {
    let mut function = shell(Type::Void, vec![]);
    let mut builder = InstructionBuilder::new(&mut function);
    let slot = builder.build_allocate(Type::I64).unwrap();
    assert_eq!(slot.ty(), Type::pointer_to(Type::I64));

    builder.build_store(&slot, &Value::from(Constant::i64(7)), 8).unwrap();
    let loaded = builder.build_load(&slot).unwrap();
    assert_eq!(loaded.ty(), Type::I64);

    let err = builder.build_store(&slot, &i32c(1), 4).unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch { operation: "store", .. }));
    let err = builder.build_load(&loaded).unwrap_err();
    assert!(matches!(err, BuildError::NotAPointer { .. }));
    builder.build_return_void();
    builder.exit_function();

    let entry = function.block_ref_at(0).unwrap();
    let instructions: Vec<&Instruction> = function.block_instructions(entry).collect();
    match instructions[0] {
        Instruction::Allocate { align, .. } => assert_eq!(*align, 4),
        other => panic!("expected alloca, got {other:?}"),
    }
    match instructions[2] {
        Instruction::Load { access, .. } => assert_eq!(access.align, 4),
        other => panic!("expected load, got {other:?}"),
    }
}

#[test]
fn test_compare_result_types() {
    let mut function = shell(Type::Void, vec![Type::vector_of(4, Type::FLOAT), Type::I8]);
    let mut builder = InstructionBuilder::new(&mut function);
    let v = builder.create_parameter(Type::vector_of(4, Type::FLOAT));
    let s = builder.create_parameter(Type::I8);

    let lanes = builder.build_compare(CompareOperator::FpOrderedLessThan, &v, &v).unwrap();
    assert_eq!(lanes.ty(), Type::vector_of(4, Type::I1));
    let flag = builder.build_compare(CompareOperator::IntEqual, &s, &s).unwrap();
    assert_eq!(flag.ty(), Type::I1);

    let err = builder.build_compare(CompareOperator::IntEqual, &s, &i32c(0)).unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch { .. }));
}

#[test]
fn test_get_element_pointer_type_walk() {
    let inner = StructType::named("struct.point", vec![Type::I32, Type::DOUBLE]);
    let base_type = Type::pointer_to(Type::array_of(4, Type::Struct(inner)));
    let mut function = shell(Type::Void, vec![base_type.clone()]);
    let mut builder = InstructionBuilder::new(&mut function);
    let base = builder.create_parameter(base_type);

    let field = builder
        .build_get_element_pointer(&base, &[i32c(0), i32c(2), i32c(1)], true)
        .unwrap();
    assert_eq!(field.ty(), Type::pointer_to(Type::DOUBLE));

    let slot = builder.build_allocate(Type::I32).unwrap();
    let index = builder.build_load(&slot).unwrap();
    let err = builder
        .build_get_element_pointer(&base, &[i32c(0), i32c(0), index], false)
        .unwrap_err();
    assert!(matches!(err, BuildError::NonConstantStructIndex { .. }));

    let err = builder
        .build_get_element_pointer(&base, &[i32c(0), i32c(0), i32c(5)], false)
        .unwrap_err();
    assert!(matches!(err, BuildError::IndexOutOfRange { index: 5, .. }));
}

#[test]
fn test_call_targets() {
    let callee = FunctionRef::new("add", FunctionType::new(Type::I32, vec![Type::I32, Type::I32], false));
    let sink = FunctionRef::new("sink", FunctionType::new(Type::Void, vec![Type::I32], false));
    let fn_ptr = Type::pointer_to(Type::Function(FunctionType::new(Type::I32, vec![], false)));

    let mut function = shell(Type::Void, vec![Type::pointer_to(fn_ptr.clone())]);
    let mut builder = InstructionBuilder::new(&mut function);
    let table = builder.create_parameter(Type::pointer_to(fn_ptr));

    let result = builder.build_call(&Value::from(callee.clone()), &[i32c(1), i32c(2)]).unwrap();
    assert_eq!(result.map(|v| v.ty()), Some(Type::I32));
    assert!(builder.build_call(&Value::from(sink), &[i32c(3)]).unwrap().is_none());

    // through a loaded function pointer
    let loaded = builder.build_load(&table).unwrap();
    let result = builder.build_call(&loaded, &[]).unwrap();
    assert_eq!(result.map(|v| v.ty()), Some(Type::I32));

    // inline assembly
    let asm = Value::from(Constant::InlineAsm(InlineAsmConstant {
        ty: Type::pointer_to(Type::Function(FunctionType::new(Type::Void, vec![], false))),
        asm: "nop".to_string(),
        constraints: String::new(),
        has_side_effects: true,
        align_stack: false,
    }));
    assert!(builder.build_call(&asm, &[]).unwrap().is_none());

    let err = builder.build_call(&i32c(0), &[]).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedCallTarget { .. }));

    // only loads may produce a callee
    let fn_ptr_ty = loaded.ty();
    let recast = builder.build_cast(CastOperator::BitCast, fn_ptr_ty, &loaded).unwrap();
    let err = builder.build_call(&recast, &[]).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedCallTarget { .. }));
    let err = builder.build_call(&Value::from(callee), &[i32c(1)]).unwrap_err();
    assert!(matches!(err, BuildError::ArgumentCount { expected: 2, found: 1, .. }));
}

#[test]
fn test_vararg_call_accepts_extra_arguments() {
    let printf = FunctionRef::new("printf", FunctionType::new(Type::I32, vec![Type::pointer_to(Type::I8)], true));
    let mut function = shell(Type::Void, vec![Type::pointer_to(Type::I8)]);
    let mut builder = InstructionBuilder::new(&mut function);
    let fmt = builder.create_parameter(Type::pointer_to(Type::I8));
    let extra = Value::from(Constant::float(FloatKind::Double, 2.0));
    let call = builder.build_call(&Value::from(printf), &[fmt, i32c(1), extra]);
    assert!(call.unwrap().is_some());
}

#[test]
fn test_phi_registers_incoming_values() {
    let mut function = shell(Type::I32, vec![Type::I1]);
    let mut builder = InstructionBuilder::new(&mut function);
    let cond = builder.create_parameter(Type::I1);
    let then_block = builder.get_block(1);
    let else_block = builder.get_block(2);
    let join = builder.get_block(3);
    builder.build_cond_branch(&cond, then_block, else_block).unwrap();
    builder.next_block();
    builder.build_branch(join);
    builder.next_block();
    builder.build_branch(join);
    builder.next_block();
    let before = builder.function().symbols().len();
    let merged = builder
        .build_phi(Type::I32, &[(i32c(1), then_block), (i32c(2), else_block)])
        .unwrap();
    assert_eq!(builder.function().symbols().len(), before + 2);
    builder.build_return(&merged);
    builder.exit_function();

    let phi = function.instructions().find(|i| matches!(i, Instruction::Phi { .. })).unwrap();
    match phi {
        Instruction::Phi { incoming, .. } => {
            assert_eq!(incoming, &vec![(before, then_block), (before + 1, else_block)]);
            assert_eq!(function.symbols().get(before), Some(&i32c(1)));
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_aggregate_value_instructions() {
    let pair = Type::Struct(StructType::literal(vec![Type::I32, Type::FLOAT]));
    let mut function = shell(Type::Void, vec![pair.clone()]);
    let mut builder = InstructionBuilder::new(&mut function);
    let agg = builder.create_parameter(pair.clone());

    let second = builder.build_extract_value(&agg, 1).unwrap();
    assert_eq!(second.ty(), Type::FLOAT);
    let updated = builder.build_insert_value(&agg, &i32c(9), 0).unwrap();
    assert_eq!(updated.ty(), pair);

    let err = builder.build_extract_value(&agg, 2).unwrap_err();
    assert!(matches!(err, BuildError::IndexOutOfRange { index: 2, .. }));
    let err = builder.build_insert_value(&agg, &i32c(9), 1).unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch { .. }));
    let err = builder.build_extract_value(&i32c(0), 0).unwrap_err();
    assert!(matches!(err, BuildError::NotAnAggregate { .. }));
}

#[test]
fn test_select_and_shuffle() {
    let v4 = Type::vector_of(4, Type::I32);
    let mut function = shell(Type::Void, vec![Type::I1, v4.clone()]);
    let mut builder = InstructionBuilder::new(&mut function);
    let cond = builder.create_parameter(Type::I1);
    let v = builder.create_parameter(v4.clone());

    let chosen = builder.build_select(&cond, &v, &v).unwrap();
    assert_eq!(chosen.ty(), v4);
    let err = builder.build_select(&i32c(1), &v, &v).unwrap_err();
    assert!(matches!(err, BuildError::InvalidCondition { .. }));

    let mask = Value::from(Constant::Aggregate {
        ty: Type::vector_of(2, Type::I32),
        elements: vec![Constant::i32(0), Constant::i32(5)],
    });
    let shuffled = builder.build_shuffle_vector(&v, &v, &mask).unwrap();
    assert_eq!(shuffled.ty(), Type::vector_of(2, Type::I32));
}

#[test]
fn test_switch_case_types() {
    let mut function = shell(Type::Void, vec![Type::I32]);
    let mut builder = InstructionBuilder::new(&mut function);
    let x = builder.create_parameter(Type::I32);
    let default = builder.get_block(1);
    let one = builder.get_block(2);
    builder.build_switch(&x, default, &[(i32c(1), one)]).unwrap();

    let err = builder
        .build_switch(&x, default, &[(Value::from(Constant::i64(1)), one)])
        .unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch { operation: "switch case", .. }));
    builder.build_switch_old(&x, default, &[(1, one), (-4, default)]).unwrap();
}

#[test]
fn test_cast_and_unreachable() {
    let mut function = shell(Type::Void, vec![Type::I8]);
    let mut builder = InstructionBuilder::new(&mut function);
    let x = builder.create_parameter(Type::I8);
    let wide = builder.build_cast(CastOperator::SExt, Type::I64, &x).unwrap();
    assert_eq!(wide.ty(), Type::I64);
    builder.build_unreachable();
    builder.exit_function();
    assert!(function.instructions().last().is_some_and(Instruction::is_terminator));
}
