//! Module and Global Variables
//!
//! Defines the top-level module structure and global variable management.

use serde::{Deserialize, Serialize};
use crate::constants::{Constant, GlobalRef};
use crate::function::FunctionDefinition;
use crate::types::Type;
use crate::values::FunctionRef;

/// Linkage types for global symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Linkage {
    #[default]
    External,  // Visible to other modules
    Internal,  // Only visible within this module
    Private,   // Not visible in the symbol table
}

/// Global variable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    pub value_type: Type,
    pub is_constant: bool,
    pub initializer: Option<Constant>,
    pub linkage: Linkage,
    /// Encoded alignment, as stored on loads and stores
    pub align: u32,
}

impl GlobalVariable {
    pub fn new(name: impl Into<String>, value_type: Type, initializer: Option<Constant>) -> Self {
        Self {
            name: name.into(),
            value_type,
            is_constant: false,
            initializer,
            linkage: Linkage::External,
            align: 0,
        }
    }

    /// Constant holding the global's address
    pub fn reference(&self) -> Constant {
        Constant::Global(GlobalRef {
            name: self.name.clone(),
            ty: Type::pointer_to(self.value_type.clone()),
        })
    }
}

/// IR Module - a complete translation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub data_layout: Option<String>,
    pub target_triple: Option<String>,
    /// Named structure and opaque types, printed as `%name = type ...`
    pub type_definitions: Vec<Type>,
    pub globals: Vec<GlobalVariable>,
    pub declarations: Vec<FunctionRef>,
    pub functions: Vec<FunctionDefinition>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_layout: None,
            target_triple: None,
            type_definitions: Vec::new(),
            globals: Vec::new(),
            declarations: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: FunctionDefinition) {
        self.functions.push(function);
    }

    pub fn add_global(&mut self, global: GlobalVariable) {
        self.globals.push(global);
    }

    /// Add an external declaration unless the name is already known
    pub fn add_declaration(&mut self, declaration: FunctionRef) {
        if !self.is_known_function(&declaration.name) {
            self.declarations.push(declaration);
        }
    }

    /// Add a named type definition unless it is already present
    pub fn add_type_definition(&mut self, ty: Type) {
        if !self.type_definitions.contains(&ty) {
            self.type_definitions.push(ty);
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Defined or declared function with this name
    pub fn is_known_function(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f.name == name)
            || self.declarations.iter().any(|d| d.name == name)
    }
}
