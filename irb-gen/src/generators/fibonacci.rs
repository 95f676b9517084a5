//! Recursive fibonacci
//!
//! `main` returns 0 when `fibonacci(10) == 55`, 1 otherwise.

use irb_builder::{ModuleBuilder, SimpleBuilder};
use irb_common::IrbError;
use irb_model::{
    BinaryOperator, CompareOperator, Constant, FunctionDefinition, FunctionRef, FunctionType, Module, Type, Value,
};

pub fn fibonacci_module() -> Result<Module, IrbError> {
    let mut module = ModuleBuilder::new("fibonacci");

    let mut fibonacci = module.create_function("fibonacci", FunctionType::new(Type::I32, vec![Type::I32], false));
    let callee = fibonacci.callable();
    {
        let mut builder = SimpleBuilder::with_data_layout(&mut fibonacci, module.data_layout());
        let n = builder.next_parameter()?;

        let is_base = builder.compare(CompareOperator::IntSignedLessOrEqual, &n, 1)?;
        let base_case = builder.get_block(1);
        let recursion = builder.get_block(2);
        builder.conditional_branch(&is_base, base_case, recursion)?;

        builder.next_block();
        builder.return_value(&n)?;

        builder.next_block();
        let target = Value::from(callee.clone());
        let n1 = builder.binary_operator(BinaryOperator::Sub, &n, 1)?;
        let fib1 = call_i32(&mut builder, &target, n1)?;
        let n2 = builder.binary_operator(BinaryOperator::Sub, &n, 2)?;
        let fib2 = call_i32(&mut builder, &target, n2)?;
        let sum = builder.binary_operator(BinaryOperator::Add, &fib1, &fib2)?;
        builder.return_value(&sum)?;
        builder.exit_function();
    }
    module.add_function(fibonacci);

    let main = build_main(&module, &callee)?;
    module.add_function(main);
    Ok(module.finish())
}

fn build_main(module: &ModuleBuilder, fibonacci: &FunctionRef) -> Result<FunctionDefinition, IrbError> {
    let mut main = module.create_function("main", FunctionType::new(Type::I32, vec![], false));
    let mut builder = SimpleBuilder::with_data_layout(&mut main, module.data_layout());
    let result = call_i32(&mut builder, &Value::from(fibonacci.clone()), Value::from(Constant::i32(10)))?;
    let failed = builder.compare(CompareOperator::IntNotEqual, &result, 55)?;
    builder.return_with_cast(&failed)?;
    builder.exit_function();
    Ok(main)
}

fn call_i32(builder: &mut SimpleBuilder<'_>, target: &Value, argument: Value) -> Result<Value, IrbError> {
    super::call_value(builder, target, &[argument])
}
