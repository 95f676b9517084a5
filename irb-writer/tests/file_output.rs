//! Writing modules to files

use std::fs;
use irb_builder::{ModuleBuilder, SimpleBuilder};
use irb_common::IrbError;
use irb_model::{FunctionType, Type, X86_64_DATA_LAYOUT};
use irb_writer::{write_module_to_file, write_module_to_string, DialectVersion};
use pretty_assertions::assert_eq;

fn answer_module() -> irb_model::Module {
    let mut module = ModuleBuilder::new("answer");
    let mut function = module.create_function("answer", FunctionType::new(Type::I32, vec![], false));
    let mut builder = SimpleBuilder::new(&mut function);
    builder.return_value(42).unwrap();
    builder.exit_function();
    module.add_function(function);
    module.finish()
}

#[test]
fn test_module_header() {
    let text = write_module_to_string(&answer_module(), DialectVersion::V32).unwrap();
    let expected = format!(
        "; ModuleID = 'answer'\n\
         target datalayout = \"{X86_64_DATA_LAYOUT}\"\n\
         target triple = \"x86_64-unknown-linux-gnu\"\n\
         \n\
         define i32 @answer() {{\n\
         \x20 ret i32 42\n\
         }}\n"
    );
    assert_eq!(text, expected);
}

#[test]
fn test_write_to_file() {
    let dir = std::env::temp_dir().join(format!("irb-writer-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("answer.ll");

    let module = answer_module();
    write_module_to_file(&module, DialectVersion::V38, &path).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, write_module_to_string(&module, DialectVersion::V38).unwrap());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_unwritable_target_names_the_path() {
    let path = std::env::temp_dir()
        .join(format!("irb-writer-missing-{}", std::process::id()))
        .join("nested")
        .join("out.ll");
    let err = write_module_to_file(&answer_module(), DialectVersion::V32, &path).unwrap_err();
    match &err {
        IrbError::Output { path: target, .. } => assert_eq!(target, &path),
        other => panic!("expected an output error, got {other:?}"),
    }
    assert!(err.to_string().contains("out.ll"));
}
