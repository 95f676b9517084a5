//! Variadic sum
//!
//! `i32 sum(i32 count, ...)` adds up `count` variable `i32` arguments in a
//! loop; `main` returns 0 when `sum(3, 10, 20, 12) == 42`.

use irb_builder::{va_list_type, ModuleBuilder, SimpleBuilder};
use irb_common::IrbError;
use irb_model::{
    BinaryOperator, CompareOperator, Constant, FunctionDefinition, FunctionRef, FunctionType, Module, Type, Value,
};

const I32_ALIGN: u64 = 4;

pub fn vararg_sum_module() -> Result<Module, IrbError> {
    let mut module = ModuleBuilder::new("vararg_sum");

    let mut sum = module.create_function("sum", FunctionType::new(Type::I32, vec![Type::I32], true));
    let callee = sum.callable();
    build_sum(&mut sum, &module)?;
    module.add_function(sum);

    let main = build_main(&module, &callee)?;
    module.add_function(main);
    Ok(module.finish())
}

fn build_sum(sum: &mut FunctionDefinition, module: &ModuleBuilder) -> Result<(), IrbError> {
    let mut builder = SimpleBuilder::with_data_layout(sum, module.data_layout());
    let count = builder.next_parameter()?;

    // handles survive the blocks va_arg inserts into the loop body
    let condition = builder.get_block(1);
    let body = builder.get_block(2);
    let exit = builder.get_block(3);

    let list = builder.allocate(va_list_type())?;
    builder.va_start(&list)?;
    let total = builder.allocate(Type::I32)?;
    builder.store(&total, 0, I32_ALIGN)?;
    let counter = builder.allocate(Type::I32)?;
    builder.store(&counter, 0, I32_ALIGN)?;
    builder.branch(condition);

    builder.next_block();
    let seen = builder.load(&counter)?;
    let more = builder.compare(CompareOperator::IntSignedLessThan, &seen, &count)?;
    builder.conditional_branch(&more, body, exit)?;

    builder.next_block();
    let argument = builder.va_arg(&list, Type::I32)?;
    let partial = builder.load(&total)?;
    let added = builder.binary_operator(BinaryOperator::Add, &partial, &argument)?;
    builder.store(&total, &added, I32_ALIGN)?;
    let seen = builder.load(&counter)?;
    let incremented = builder.binary_operator(BinaryOperator::Add, &seen, 1)?;
    builder.store(&counter, &incremented, I32_ALIGN)?;
    builder.branch(condition);

    let entered = builder.next_block();
    debug_assert_eq!(entered, exit);
    builder.va_end(&list)?;
    let result = builder.load(&total)?;
    builder.return_value(&result)?;
    builder.exit_function();
    Ok(())
}

fn build_main(module: &ModuleBuilder, sum: &FunctionRef) -> Result<FunctionDefinition, IrbError> {
    let mut main = module.create_function("main", FunctionType::new(Type::I32, vec![], false));
    let mut builder = SimpleBuilder::with_data_layout(&mut main, module.data_layout());
    let arguments: Vec<Value> = [3, 10, 20, 12]
        .into_iter()
        .map(|value| Value::from(Constant::i32(value)))
        .collect();
    let result = super::call_value(&mut builder, &Value::from(sum.clone()), &arguments)?;
    let failed = builder.compare(CompareOperator::IntNotEqual, &result, 42)?;
    builder.return_with_cast(&failed)?;
    builder.exit_function();
    Ok(main)
}
