//! Vector comparison
//!
//! `vector_compare` fills two `<4 x i32>` vectors with the same lanes and
//! returns the folded `icmp ne`, so 0 when every lane matches.
//! `vector_compare_mixed` differs in one lane and returns 0 when the folded
//! `icmp eq` is false and the folded `icmp ne` is true.

use irb_builder::{ModuleBuilder, SimpleBuilder};
use irb_common::IrbError;
use irb_model::{BinaryOperator, CompareOperator, FunctionType, Module, Type, Value};

const LANES: [i32; 4] = [1, 2, 3, 4];
const MIXED_LANES: [i32; 4] = [1, 2, 0, 4];

pub fn vector_compare_module() -> Result<Module, IrbError> {
    build_main("vector_compare", |builder| {
        let (left, right) = fill_pair(builder, LANES, LANES)?;
        let differs = builder.compare_vector(CompareOperator::IntNotEqual, &left, &right)?;
        Ok(differs)
    })
}

pub fn vector_compare_mixed_module() -> Result<Module, IrbError> {
    build_main("vector_compare_mixed", |builder| {
        let (left, right) = fill_pair(builder, LANES, MIXED_LANES)?;
        let all_equal = builder.compare_vector(CompareOperator::IntEqual, &left, &right)?;
        let any_differs = builder.compare_vector(CompareOperator::IntNotEqual, &left, &right)?;
        let none_differs = builder.binary_operator(BinaryOperator::Xor, &any_differs, true)?;
        let failed = builder.binary_operator(BinaryOperator::Or, &all_equal, &none_differs)?;
        Ok(failed)
    })
}

/// `i32 main()` returning the `i1` produced by `body`, zero-extended
fn build_main<F>(name: &str, body: F) -> Result<Module, IrbError>
where
    F: FnOnce(&mut SimpleBuilder<'_>) -> Result<Value, IrbError>,
{
    let mut module = ModuleBuilder::new(name);
    let mut main = module.create_function("main", FunctionType::new(Type::I32, vec![], false));
    {
        let mut builder = SimpleBuilder::with_data_layout(&mut main, module.data_layout());
        let failed = body(&mut builder)?;
        builder.return_with_cast(&failed)?;
        builder.exit_function();
    }
    module.add_function(main);
    Ok(module.finish())
}

fn fill_pair(
    builder: &mut SimpleBuilder<'_>,
    left: [i32; 4],
    right: [i32; 4],
) -> Result<(Value, Value), IrbError> {
    let vector = Type::vector_of(left.len() as u32, Type::I32);
    let left_slot = builder.allocate(vector.clone())?;
    let right_slot = builder.allocate(vector)?;
    let left = builder.fill_vector(&left_slot, left)?;
    let right = builder.fill_vector(&right_slot, right)?;
    Ok((left, right))
}
