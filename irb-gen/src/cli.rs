use clap::{Parser, Subcommand, ValueEnum};
use irb_writer::DialectVersion;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "irbgen",
    about = "Generate example LLVM IR modules",
    long_about = "irbgen - build example modules with the IR builder and print them as LLVM assembly.\n\nThe dialect defaults to the IRB_LLVM_VERSION environment variable, then to 3.2.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available generators
    List,

    /// Build one module and print it
    Generate {
        /// Generator name (see `list`)
        name: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// LLVM assembly dialect
        #[arg(long = "llvm-version")]
        llvm_version: Option<VersionArg>,

        /// Dump the module model as JSON instead of LLVM assembly
        #[arg(long)]
        json: bool,
    },

    /// Build every module into `<name>.ll` files
    All {
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// LLVM assembly dialect
        #[arg(long = "llvm-version")]
        llvm_version: Option<VersionArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VersionArg {
    #[value(name = "3.2")]
    V32,
    #[value(name = "3.8")]
    V38,
}

impl VersionArg {
    pub fn to_version(self) -> DialectVersion {
        match self {
            VersionArg::V32 => DialectVersion::V32,
            VersionArg::V38 => DialectVersion::V38,
        }
    }
}

/// The requested dialect, falling back to the environment
pub fn resolve_version(arg: Option<VersionArg>) -> DialectVersion {
    arg.map(VersionArg::to_version).unwrap_or_else(DialectVersion::from_env)
}
