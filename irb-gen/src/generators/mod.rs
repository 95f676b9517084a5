//! Example modules
//!
//! Each generator builds a complete module whose `main` returns 0 when the
//! computed result matches the expected one.

mod fibonacci;
mod vararg_sum;
mod vector_compare;

pub use fibonacci::fibonacci_module;
pub use vararg_sum::vararg_sum_module;
pub use vector_compare::{vector_compare_mixed_module, vector_compare_module};

use irb_builder::SimpleBuilder;
use irb_common::IrbError;
use irb_model::{Module, Value};

/// A named module generator
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn() -> Result<Module, IrbError>,
}

const GENERATORS: &[Generator] = &[
    Generator {
        name: "fibonacci",
        description: "recursive fibonacci, main checks fibonacci(10) == 55",
        build: fibonacci_module,
    },
    Generator {
        name: "vararg-sum",
        description: "variadic sum over va_arg, main checks sum(10, 20, 12) == 42",
        build: vararg_sum_module,
    },
    Generator {
        name: "vector-compare",
        description: "fills two <4 x i32> vectors and folds a lane-wise compare",
        build: vector_compare_module,
    },
    Generator {
        name: "vector-compare-mixed",
        description: "one differing lane: folded eq must be false, folded ne true",
        build: vector_compare_mixed_module,
    },
];

pub fn generators() -> &'static [Generator] {
    GENERATORS
}

pub fn find_generator(name: &str) -> Option<&'static Generator> {
    GENERATORS.iter().find(|generator| generator.name == name)
}

/// Call `target` and require a result value
fn call_value(builder: &mut SimpleBuilder<'_>, target: &Value, arguments: &[Value]) -> Result<Value, IrbError> {
    builder.call(target, arguments)?.ok_or_else(|| IrbError::Build {
        message: format!("call to {} produced no value", target.name().unwrap_or("<callee>")),
    })
}
