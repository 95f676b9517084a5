//! Convenience builder tests: literal promotion and multi-instruction patterns

use irb_builder::{literal_to_constant, BuildError, Literal, SimpleBuilder};
use irb_model::{
    BinaryOperator, CastOperator, CompareOperator, Constant, FloatConstant, FloatKind, FunctionDefinition,
    FunctionType, Instruction, Type, Value,
};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

fn function(ret: Type, params: Vec<Type>) -> FunctionDefinition {
    FunctionDefinition::new("f", FunctionType::new(ret, params, false))
}

/// Opcodes of every instruction in creation order
fn opcodes(function: &FunctionDefinition) -> Vec<String> {
    function.instructions().map(Instruction::opcode).collect()
}

#[test]
fn test_integer_literals_take_target_width() {
    assert_eq!(literal_to_constant(&Type::I8, &Literal::Int(5)).unwrap(), Constant::i8(5));
    assert_eq!(literal_to_constant(&Type::I8, &Literal::Int(255)).unwrap(), Constant::i8(-1));
    assert_eq!(literal_to_constant(&Type::I1, &Literal::Bool(true)).unwrap(), Constant::i1(true));
}

#[test]
fn test_float_and_big_literals() {
    let half = literal_to_constant(&Type::FLOAT, &Literal::Float(1.5)).unwrap();
    assert_eq!(half, Constant::Float(FloatConstant::from_f64(FloatKind::Float, 1.5)));

    let big: BigInt = BigInt::from(1u8) << 100;
    let wide = literal_to_constant(&Type::Integer(128), &Literal::BigInt(big.clone())).unwrap();
    assert_eq!(wide, Constant::big_integer(Type::Integer(128), big));

    let err = literal_to_constant(&Type::I32, &Literal::Float(0.5)).unwrap_err();
    assert!(matches!(err, BuildError::LiteralTarget { .. }));
    let err = literal_to_constant(&Type::pointer_to(Type::I8), &Literal::Int(0)).unwrap_err();
    assert!(matches!(err, BuildError::LiteralTarget { .. }));
}

#[test]
fn test_literal_operands_follow_the_other_side() {
    let mut f = function(Type::I16, vec![Type::I16]);
    let mut builder = SimpleBuilder::new(&mut f);
    let x = builder.next_parameter().unwrap();

    let sum = builder.binary_operator(BinaryOperator::Add, &x, 3).unwrap();
    assert_eq!(sum.ty(), Type::I16);
    let diff = builder.binary_operator(BinaryOperator::Sub, 100, &sum).unwrap();
    assert_eq!(diff.ty(), Type::I16);

    let err = builder.binary_operator(BinaryOperator::Add, 1, 2).unwrap_err();
    assert!(matches!(err, BuildError::UntypedOperands { .. }));

    builder.return_value(&diff).unwrap();
    builder.exit_function();

    assert_eq!(f.symbols().get(1), Some(&Value::from(Constant::integer(Type::I16, 3))));
    assert_eq!(f.symbols().get(2), Some(&Value::from(Constant::integer(Type::I16, 100))));
}

#[test]
fn test_next_parameter_runs_out() {
    let mut f = function(Type::Void, vec![Type::I32]);
    let mut builder = SimpleBuilder::new(&mut f);
    let first = builder.next_parameter().unwrap();
    assert_eq!(first.name(), Some("arg_1"));
    let err = builder.next_parameter().unwrap_err();
    assert!(matches!(err, BuildError::NoMoreParameters { declared: 1, .. }));
}

#[test]
fn test_compare_vector_folds_lanes() {
    let v4 = Type::vector_of(4, Type::I32);
    let mut f = function(Type::I1, vec![v4.clone(), v4]);
    let mut builder = SimpleBuilder::new(&mut f);
    let a = builder.next_parameter().unwrap();
    let b = builder.next_parameter().unwrap();
    let equal = builder.compare_vector(CompareOperator::IntEqual, &a, &b).unwrap();
    assert_eq!(equal.ty(), Type::I1);
    builder.return_value(&equal).unwrap();
    builder.exit_function();

    let mut expected = vec!["icmp".to_string(), "extractelement".to_string()];
    for _ in 1..4 {
        expected.push("extractelement".to_string());
        expected.push("and".to_string());
    }
    expected.push("ret".to_string());
    assert_eq!(opcodes(&f), expected);
}

#[test]
fn test_compare_vector_inequality_uses_or() {
    let v2 = Type::vector_of(2, Type::DOUBLE);
    let mut f = function(Type::I1, vec![v2.clone(), v2]);
    let mut builder = SimpleBuilder::new(&mut f);
    let a = builder.next_parameter().unwrap();
    let b = builder.next_parameter().unwrap();
    let differ = builder.compare_vector(CompareOperator::FpOrderedNotEqual, &a, &b).unwrap();
    builder.return_value(&differ).unwrap();
    builder.exit_function();

    assert_eq!(opcodes(&f), vec!["fcmp", "extractelement", "extractelement", "or", "ret"]);
}

#[test]
fn test_compare_vector_rejects_scalars() {
    let mut f = function(Type::I1, vec![Type::I32]);
    let mut builder = SimpleBuilder::new(&mut f);
    let a = builder.next_parameter().unwrap();
    let err = builder.compare_vector(CompareOperator::IntEqual, &a, 0).unwrap_err();
    assert!(matches!(err, BuildError::NotAVector { .. }));
}

#[test]
fn test_fill_vector() {
    let v3 = Type::vector_of(3, Type::FLOAT);
    let mut f = function(v3.clone(), vec![]);
    let mut builder = SimpleBuilder::new(&mut f);
    let slot = builder.allocate(v3.clone()).unwrap();
    let filled = builder.fill_vector(&slot, [1.0, 2.0, 3.0]).unwrap();
    assert_eq!(filled.ty(), v3);
    builder.return_value(&filled).unwrap();
    builder.exit_function();

    assert_eq!(
        opcodes(&f),
        vec!["alloca", "load", "insertelement", "insertelement", "insertelement", "ret"]
    );
}

#[test]
fn test_return_with_cast() {
    let mut f = function(Type::I32, vec![Type::I1]);
    let mut builder = SimpleBuilder::new(&mut f);
    let flag = builder.next_parameter().unwrap();
    builder.return_with_cast(&flag).unwrap();
    builder.exit_function();
    match f.instructions().next() {
        Some(Instruction::Cast { operator, result_type, .. }) => {
            assert_eq!(*operator, CastOperator::ZExt);
            assert_eq!(*result_type, Type::I32);
        }
        other => panic!("expected a cast, got {other:?}"),
    }

    let mut f = function(Type::I8, vec![Type::I64]);
    let mut builder = SimpleBuilder::new(&mut f);
    let wide = builder.next_parameter().unwrap();
    builder.return_with_cast(&wide).unwrap();
    builder.exit_function();
    assert_eq!(opcodes(&f), vec!["trunc", "ret"]);

    let mut f = function(Type::DOUBLE, vec![Type::I64]);
    let mut builder = SimpleBuilder::new(&mut f);
    let bits = builder.next_parameter().unwrap();
    builder.return_with_cast(&bits).unwrap();
    builder.exit_function();
    assert_eq!(opcodes(&f), vec!["bitcast", "ret"]);

    let mut f = function(Type::DOUBLE, vec![Type::I32]);
    let mut builder = SimpleBuilder::new(&mut f);
    let narrow = builder.next_parameter().unwrap();
    let err = builder.return_with_cast(&narrow).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedCast { .. }));
}

#[test]
fn test_return_with_cast_between_pointers_and_integers() {
    let byte_ptr = Type::pointer_to(Type::I8);

    let mut f = function(Type::I64, vec![byte_ptr.clone()]);
    let mut builder = SimpleBuilder::new(&mut f);
    let address = builder.next_parameter().unwrap();
    builder.return_with_cast(&address).unwrap();
    builder.exit_function();
    assert_eq!(opcodes(&f), vec!["ptrtoint", "ret"]);

    let mut f = function(byte_ptr.clone(), vec![Type::I64]);
    let mut builder = SimpleBuilder::new(&mut f);
    let raw = builder.next_parameter().unwrap();
    builder.return_with_cast(&raw).unwrap();
    builder.exit_function();
    assert_eq!(opcodes(&f), vec!["inttoptr", "ret"]);

    let mut f = function(Type::pointer_to(Type::I32), vec![byte_ptr.clone()]);
    let mut builder = SimpleBuilder::new(&mut f);
    let bytes = builder.next_parameter().unwrap();
    builder.return_with_cast(&bytes).unwrap();
    builder.exit_function();
    assert_eq!(opcodes(&f), vec!["bitcast", "ret"]);

    let mut f = function(Type::DOUBLE, vec![byte_ptr]);
    let mut builder = SimpleBuilder::new(&mut f);
    let pointer = builder.next_parameter().unwrap();
    let err = builder.return_with_cast(&pointer).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedCast { .. }));
}

#[test]
fn test_return_value_checks_type() {
    let mut f = function(Type::I32, vec![Type::I64]);
    let mut builder = SimpleBuilder::new(&mut f);
    let x = builder.next_parameter().unwrap();
    let err = builder.return_value(&x).unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch { operation: "ret", .. }));
    builder.return_value(0).unwrap();
}

#[test]
fn test_store_literal_takes_pointee_type() {
    let mut f = function(Type::Void, vec![]);
    let mut builder = SimpleBuilder::new(&mut f);
    let slot = builder.allocate(Type::I64).unwrap();
    builder.store(&slot, 42, 8).unwrap();
    builder.return_void();
    builder.exit_function();
    assert!(f.symbols().iter().any(|v| *v == Value::from(Constant::i64(42))));
}
