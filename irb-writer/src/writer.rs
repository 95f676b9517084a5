//! Module and function output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use irb_common::IrbError;
use irb_model::{FunctionDefinition, FunctionRef, GlobalVariable, Linkage, Module, Type};
use irb_model::instructions::decode_alignment;
use log::{debug, info};
use crate::format::{self, global, local};
use crate::instructions::{formal_parameters, InstructionPrinter, INDENT};
use crate::{DialectVersion, WriteError};

/// Prints modules as LLVM assembly
pub struct IrWriter<W: Write> {
    out: W,
    version: DialectVersion,
}

impl<W: Write> IrWriter<W> {
    pub fn new(out: W, version: DialectVersion) -> Self {
        Self { out, version }
    }

    pub fn version(&self) -> DialectVersion {
        self.version
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Header, type definitions, globals, definitions and declarations,
    /// each group separated by a blank line
    pub fn write_module(&mut self, module: &Module) -> Result<(), WriteError> {
        writeln!(self.out, "; ModuleID = '{}'", module.name)?;
        if let Some(layout) = &module.data_layout {
            writeln!(self.out, "target datalayout = \"{}\"", format::escape_string(layout))?;
        }
        if let Some(triple) = &module.target_triple {
            writeln!(self.out, "target triple = \"{}\"", format::escape_string(triple))?;
        }

        if !module.type_definitions.is_empty() {
            writeln!(self.out)?;
            for ty in &module.type_definitions {
                self.write_type_definition(ty)?;
            }
        }

        if !module.globals.is_empty() {
            writeln!(self.out)?;
            for global in &module.globals {
                self.write_global(global)?;
            }
        }

        for function in &module.functions {
            writeln!(self.out)?;
            self.write_function(function)?;
        }

        if !module.declarations.is_empty() {
            writeln!(self.out)?;
            for declaration in &module.declarations {
                self.write_declaration(declaration)?;
            }
        }

        debug!(
            "wrote module '{}' ({} definition(s), LLVM {})",
            module.name,
            module.functions.len(),
            self.version
        );
        Ok(())
    }

    /// `%name = type { ... }` or `%name = type opaque`
    pub fn write_type_definition(&mut self, ty: &Type) -> Result<(), WriteError> {
        match ty {
            Type::Struct(st) => match &st.name {
                Some(name) => writeln!(self.out, "{} = type {st}", local(name))?,
                None => return Err(WriteError::not_implemented(format!("type definition of literal {ty}"))),
            },
            Type::Opaque(name) => writeln!(self.out, "{} = type opaque", local(name))?,
            other => return Err(WriteError::not_implemented(format!("type definition of {other}"))),
        }
        Ok(())
    }

    /// `@name = [linkage ]global|constant <ty> <init>[, align N]`
    pub fn write_global(&mut self, variable: &GlobalVariable) -> Result<(), WriteError> {
        let linkage = match (variable.linkage, &variable.initializer) {
            (Linkage::Internal, _) => "internal ",
            (Linkage::Private, _) => "private ",
            (Linkage::External, None) => "external ",
            (Linkage::External, Some(_)) => "",
        };
        let kind = if variable.is_constant { "constant" } else { "global" };
        write!(self.out, "{} = {linkage}{kind} {}", global(&variable.name), variable.value_type)?;
        if let Some(init) = &variable.initializer {
            write!(self.out, " {}", format::constant(init, self.version)?)?;
        }
        if let Some(align) = decode_alignment(variable.align) {
            write!(self.out, ", align {align}")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// `declare <ret> @name(<params>)`
    pub fn write_declaration(&mut self, declaration: &FunctionRef) -> Result<(), WriteError> {
        writeln!(
            self.out,
            "declare {} {}{}",
            declaration.ty.return_type,
            global(&declaration.name),
            formal_parameters(&declaration.ty)
        )?;
        Ok(())
    }

    /// Header line, blocks separated by blank lines, closing brace
    pub fn write_function(&mut self, function: &FunctionDefinition) -> Result<(), WriteError> {
        let mut params: Vec<String> = function
            .parameters
            .iter()
            .map(|param| format!("{} {}", param.ty, local(&param.name)))
            .collect();
        if function.ty.is_vararg {
            params.push("...".to_string());
        }
        writeln!(
            self.out,
            "define {} {}({}) {{",
            function.return_type(),
            global(&function.name),
            params.join(", ")
        )?;

        let printer = InstructionPrinter::new(function, self.version);
        for (position, block) in function.blocks().enumerate() {
            if position > 0 {
                writeln!(self.out)?;
                match &block.name {
                    Some(name) => writeln!(self.out, "{}:", format::identifier('%', name).trim_start_matches('%'))?,
                    None => writeln!(self.out, "; <label>:{}", block.index)?,
                }
            }
            for id in &block.instructions {
                let line = printer.instruction(function.instruction(*id))?;
                writeln!(self.out, "{INDENT}{line}")?;
            }
        }
        writeln!(self.out, "}}")?;
        Ok(())
    }
}

/// Print a module into a string
pub fn write_module_to_string(module: &Module, version: DialectVersion) -> Result<String, WriteError> {
    let mut writer = IrWriter::new(Vec::new(), version);
    writer.write_module(module)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Print a module into a file, creating or truncating it
pub fn write_module_to_file(module: &Module, version: DialectVersion, path: &Path) -> Result<(), IrbError> {
    let file = File::create(path).map_err(|err| IrbError::output(path, err))?;
    let mut writer = IrWriter::new(BufWriter::new(file), version);
    match writer.write_module(module) {
        Ok(()) => {}
        Err(WriteError::Io(err)) => return Err(IrbError::output(path, err)),
        Err(err) => return Err(err.into()),
    }
    writer.into_inner().flush().map_err(|err| IrbError::output(path, err))?;
    info!("wrote {}", path.display());
    Ok(())
}
