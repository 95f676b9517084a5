//! Example modules, built and printed end to end

use irb_gen::{
    fibonacci_module, find_generator, generators, vararg_sum_module, vector_compare_mixed_module, vector_compare_module,
};
use irb_model::{
    BinaryOperator, CastOperator, CompareOperator, FunctionDefinition, Instruction, SymbolIndex, Type, Value,
    X86_64_DATA_LAYOUT,
};
use irb_writer::{write_module_to_string, DialectVersion};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn opcodes(function: &FunctionDefinition) -> Vec<String> {
    function.instructions().map(Instruction::opcode).collect()
}

#[test]
fn test_fibonacci_text() {
    let module = fibonacci_module().unwrap();
    let text = write_module_to_string(&module, DialectVersion::V32).unwrap();
    let expected = format!(
        "; ModuleID = 'fibonacci'
target datalayout = \"{X86_64_DATA_LAYOUT}\"
target triple = \"x86_64-unknown-linux-gnu\"

define i32 @fibonacci(i32 %arg_1) {{
  %1 = icmp sle i32 %arg_1, 1
  br i1 %1, label %label_1, label %label_2

label_1:
  ret i32 %arg_1

label_2:
  %2 = sub i32 %arg_1, 1
  %3 = call i32 @fibonacci(i32 %2)
  %4 = sub i32 %arg_1, 2
  %5 = call i32 @fibonacci(i32 %4)
  %6 = add i32 %3, %5
  ret i32 %6
}}

define i32 @main() {{
  %1 = call i32 @fibonacci(i32 10)
  %2 = icmp ne i32 %1, 55
  %3 = zext i1 %2 to i32
  ret i32 %3
}}
"
    );
    assert_eq!(text, expected);
}

#[test]
fn test_fibonacci_structure() {
    let module = fibonacci_module().unwrap();
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["fibonacci", "main"]);
    assert!(module.declarations.is_empty());

    let fibonacci = module.get_function("fibonacci").unwrap();
    assert_eq!(fibonacci.block_count(), 3);
    let entry: Vec<String> = fibonacci
        .entry_block()
        .unwrap()
        .instructions
        .iter()
        .map(|id| fibonacci.instruction(*id).opcode())
        .collect();
    assert_eq!(entry, vec!["icmp", "br"]);
}

#[test]
fn test_vararg_sum_loop() {
    let module = vararg_sum_module().unwrap();
    let sum = module.get_function("sum").unwrap();

    // entry, condition, body, register, stack, join, exit
    assert_eq!(sum.block_count(), 7);
    let exit = sum.block_at(6).unwrap();
    assert_eq!(exit.name.as_deref(), Some("label_6"));
    let returns = sum
        .block_instructions(exit.id)
        .filter(|inst| matches!(inst, Instruction::Return { .. }))
        .count();
    assert_eq!(returns, 1);

    let declared: Vec<&str> = module.declarations.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(declared, vec!["llvm.va_start", "llvm.va_end"]);
    assert_eq!(module.type_definitions, vec![irb_builder::va_list_tag_type()]);
}

#[test]
fn test_vararg_sum_call_dialects() {
    let module = vararg_sum_module().unwrap();
    let v32 = write_module_to_string(&module, DialectVersion::V32).unwrap();
    assert!(v32.contains("call i32 (i32, ...)* @sum(i32 3, i32 10, i32 20, i32 12)"));
    assert!(v32.contains("define i32 @sum(i32 %arg_1, ...) {"));

    let v38 = write_module_to_string(&module, DialectVersion::V38).unwrap();
    assert!(v38.contains("call i32 (i32, ...) @sum(i32 3, i32 10, i32 20, i32 12)"));
}

#[test]
fn test_vector_compare_folds_lanes() {
    let module = vector_compare_module().unwrap();
    let main = module.get_function("main").unwrap();

    let mut expected = vec!["alloca", "alloca"];
    for _ in 0..2 {
        expected.push("load");
        expected.extend(["insertelement"; 4]);
    }
    expected.extend(["icmp", "extractelement"]);
    for _ in 1..4 {
        expected.extend(["extractelement", "or"]);
    }
    expected.extend(["zext", "ret"]);
    assert_eq!(opcodes(main), expected);

    let slot = Type::pointer_to(Type::vector_of(4, Type::I32));
    let allocas = main
        .instructions()
        .filter(|inst| inst.result_type() == Some(&slot))
        .count();
    assert_eq!(allocas, 2);
}

/// Register contents while running a straight-line function
#[derive(Debug, Clone, PartialEq)]
enum Register {
    Scalar(i64),
    Lanes(Vec<i64>),
}

fn read(function: &FunctionDefinition, registers: &HashMap<String, Register>, index: SymbolIndex) -> Register {
    match function.symbols().get(index) {
        Some(Value::Constant(constant)) => {
            let value = constant.as_integer().unwrap();
            Register::Scalar(if constant.ty() == Type::I1 { value & 1 } else { value })
        }
        Some(Value::Instruction(inst)) => registers[&inst.name].clone(),
        other => panic!("unexpected operand {other:?}"),
    }
}

fn scalar(register: Register) -> i64 {
    match register {
        Register::Scalar(value) => value,
        other => panic!("expected a scalar, got {other:?}"),
    }
}

fn lanes_of(register: Register) -> Vec<i64> {
    match register {
        Register::Lanes(lanes) => lanes,
        other => panic!("expected a vector, got {other:?}"),
    }
}

/// Run a single-block function built from integer vector operations.
/// Loaded vectors start out zeroed.
fn run(function: &FunctionDefinition) -> i64 {
    let mut registers = HashMap::new();
    for inst in function.instructions() {
        let value = match inst {
            Instruction::Allocate { .. } => Register::Scalar(0),
            Instruction::Load { result_type: Type::Vector { len, .. }, .. } => Register::Lanes(vec![0; *len as usize]),
            Instruction::InsertElement { vector, value, index, .. } => {
                let mut lanes = lanes_of(read(function, &registers, *vector));
                let lane = scalar(read(function, &registers, *index)) as usize;
                lanes[lane] = scalar(read(function, &registers, *value));
                Register::Lanes(lanes)
            }
            Instruction::ExtractElement { vector, index, .. } => {
                let lanes = lanes_of(read(function, &registers, *vector));
                Register::Scalar(lanes[scalar(read(function, &registers, *index)) as usize])
            }
            Instruction::Compare { operator, lhs, rhs, .. } => {
                let left = lanes_of(read(function, &registers, *lhs));
                let right = lanes_of(read(function, &registers, *rhs));
                let lanes = left
                    .iter()
                    .zip(&right)
                    .map(|(l, r)| match operator {
                        CompareOperator::IntEqual => i64::from(l == r),
                        CompareOperator::IntNotEqual => i64::from(l != r),
                        other => panic!("unexpected predicate {other:?}"),
                    })
                    .collect();
                Register::Lanes(lanes)
            }
            Instruction::BinaryOperation { operator, lhs, rhs, .. } => {
                let left = scalar(read(function, &registers, *lhs));
                let right = scalar(read(function, &registers, *rhs));
                Register::Scalar(match operator {
                    BinaryOperator::And => left & right,
                    BinaryOperator::Or => left | right,
                    BinaryOperator::Xor => left ^ right,
                    other => panic!("unexpected operator {other:?}"),
                })
            }
            Instruction::Cast { operator: CastOperator::ZExt, value, .. } => read(function, &registers, *value),
            Instruction::Return { value: Some(value) } => return scalar(read(function, &registers, *value)),
            other => panic!("unexpected instruction {other:?}"),
        };
        registers.insert(inst.result().unwrap().to_string(), value);
    }
    panic!("function '{}' does not return", function.name)
}

#[test]
fn test_vector_compare_returns_zero() {
    let module = vector_compare_module().unwrap();
    assert_eq!(run(module.get_function("main").unwrap()), 0);
}

#[test]
fn test_mixed_lanes_fold_eq_false_and_ne_true() {
    let module = vector_compare_mixed_module().unwrap();
    let main = module.get_function("main").unwrap();
    assert_eq!(run(main), 0);

    // one and-folded eq chain, one or-folded ne chain
    let folds: Vec<String> = opcodes(main)
        .into_iter()
        .filter(|op| op == "and" || op == "or")
        .collect();
    assert_eq!(folds, vec!["and", "and", "and", "or", "or", "or", "or"]);
}

#[test]
fn test_every_generator_prints_in_both_dialects() {
    assert_eq!(generators().len(), 4);
    for generator in generators() {
        let module = (generator.build)().unwrap();
        for version in [DialectVersion::V32, DialectVersion::V38] {
            let text = write_module_to_string(&module, version).unwrap();
            assert!(text.starts_with(&format!("; ModuleID = '{}'", module.name)));
            assert_eq!(text.matches("define i32 @main()").count(), 1, "{}", generator.name);
        }
    }
}

#[test]
fn test_find_generator() {
    assert_eq!(find_generator("fibonacci").map(|g| g.name), Some("fibonacci"));
    assert!(find_generator("quicksort").is_none());
}
