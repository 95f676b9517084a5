//! Example module generators
//!
//! Each generator drives the IR builder through a small program and hands
//! back the finished module; `irbgen` prints them with the writer.

pub mod cli;
pub mod generators;

pub use generators::{
    fibonacci_module, find_generator, generators, vararg_sum_module, vector_compare_mixed_module, vector_compare_module,
    Generator,
};
