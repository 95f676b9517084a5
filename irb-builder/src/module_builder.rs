//! Module Builder
//!
//! Collects function definitions, declarations, globals and named types
//! into a [`Module`].

use irb_common::IrbError;
use irb_model::{
    Constant, DataLayout, FunctionDefinition, FunctionRef, FunctionType, GlobalVariable, Instruction,
    Module, Type, Value, DEFAULT_DATA_LAYOUT, X86_64_DATA_LAYOUT,
};
use log::debug;

/// Target triple matching the default data layout
pub const X86_64_TARGET_TRIPLE: &str = "x86_64-unknown-linux-gnu";

/// Builder for a complete module
pub struct ModuleBuilder {
    module: Module,
    layout: DataLayout,
}

impl ModuleBuilder {
    /// Module targeting x86-64 Linux
    pub fn new(name: impl Into<String>) -> Self {
        let mut module = Module::new(name);
        module.data_layout = Some(X86_64_DATA_LAYOUT.to_string());
        module.target_triple = Some(X86_64_TARGET_TRIPLE.to_string());
        Self {
            module,
            layout: DEFAULT_DATA_LAYOUT.clone(),
        }
    }

    /// Module with a custom data layout and no target triple
    pub fn with_data_layout(name: impl Into<String>, layout: &str) -> Result<Self, IrbError> {
        let parsed = DataLayout::parse(layout)?;
        let mut module = Module::new(name);
        module.data_layout = Some(layout.to_string());
        Ok(Self { module, layout: parsed })
    }

    pub fn data_layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn set_target_triple(&mut self, triple: impl Into<String>) {
        self.module.target_triple = Some(triple.into());
    }

    /// Empty function shell, to be filled by an instruction builder and
    /// handed back through [`add_function`](Self::add_function)
    pub fn create_function(&self, name: impl Into<String>, ty: FunctionType) -> FunctionDefinition {
        FunctionDefinition::new(name, ty)
    }

    /// Add a finished definition. A previous declaration of the same name is
    /// replaced by the definition.
    pub fn add_function(&mut self, function: FunctionDefinition) -> FunctionRef {
        let callable = function.callable();
        self.module.declarations.retain(|d| d.name != function.name);
        self.module.add_function(function);
        callable
    }

    /// Declare an external function
    pub fn declare_function(&mut self, name: impl Into<String>, ty: FunctionType) -> FunctionRef {
        let declaration = FunctionRef::new(name, ty);
        self.module.add_declaration(declaration.clone());
        declaration
    }

    pub fn add_type_definition(&mut self, ty: Type) {
        self.module.add_type_definition(ty);
    }

    /// Add a global variable and return a constant holding its address
    pub fn add_global(&mut self, global: GlobalVariable) -> Constant {
        let reference = global.reference();
        self.module.add_global(global);
        reference
    }

    /// Finish the module: declare every callee that is referenced but not
    /// defined, and define every named type that is referenced.
    pub fn finish(mut self) -> Module {
        let mut callees = Vec::new();
        let mut named_types = Vec::new();

        for global in &self.module.globals {
            global.value_type.collect_named_types(&mut named_types);
        }
        for declaration in &self.module.declarations {
            Type::Function(declaration.ty.clone()).collect_named_types(&mut named_types);
        }
        for function in &self.module.functions {
            Type::Function(function.ty.clone()).collect_named_types(&mut named_types);
            for value in function.symbols().iter() {
                if let Value::Function(callee) = value {
                    callees.push(callee.clone());
                }
                value.ty().collect_named_types(&mut named_types);
            }
            for instruction in function.instructions() {
                if let Some(ty) = instruction.result_type() {
                    ty.collect_named_types(&mut named_types);
                }
                if let Instruction::Allocate { allocated_type, .. } = instruction {
                    allocated_type.collect_named_types(&mut named_types);
                }
            }
        }

        for callee in callees {
            self.module.add_declaration(callee);
        }
        for ty in named_types {
            self.module.add_type_definition(ty);
        }

        debug!(
            "finished module '{}': {} definition(s), {} declaration(s), {} type(s), {} global(s)",
            self.module.name,
            self.module.functions.len(),
            self.module.declarations.len(),
            self.module.type_definitions.len(),
            self.module.globals.len()
        );
        self.module
    }
}
