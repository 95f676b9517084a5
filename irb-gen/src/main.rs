use clap::Parser;
use irb_gen::cli::{resolve_version, Cli, Command};
use irb_gen::{find_generator, generators};
use irb_writer::{write_module_to_file, write_module_to_string};
use log::info;
use std::error::Error;
use std::fs;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            for generator in generators() {
                println!("{:<16} {}", generator.name, generator.description);
            }
        }

        Command::Generate { name, output, llvm_version, json } => {
            let generator = find_generator(&name)
                .ok_or_else(|| format!("unknown generator '{name}' (try `irbgen list`)"))?;
            let module = (generator.build)()?;

            let text = if json {
                serde_json::to_string_pretty(&module)?
            } else {
                write_module_to_string(&module, resolve_version(llvm_version))?
            };

            match output {
                Some(path) => {
                    fs::write(&path, text)?;
                    info!("wrote {} to {}", name, path.display());
                }
                None => print!("{text}"),
            }
        }

        Command::All { out_dir, llvm_version } => {
            let version = resolve_version(llvm_version);
            fs::create_dir_all(&out_dir)?;
            for generator in generators() {
                let module = (generator.build)()?;
                let path = out_dir.join(format!("{}.ll", generator.name));
                write_module_to_file(&module, version, &path)?;
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
