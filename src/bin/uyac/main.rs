//! # uyac
//!
//! This binary drives the backend of the Uya compiler. It reads a
//! serialized, already-type-checked AST and lowers it to a single C99
//! translation unit.
extern crate uya;

mod cli;

use cli::*;

use std::{error::Error, fs, io::Write};

use log::info;
use uya::ast::Program;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level(args.verbosity.into()).unwrap();

    let Commands::Build(build_args) = args.command;

    let file = fs::canonicalize(&build_args.file)?;

    info!("reading AST from {}", file.display());
    let source = fs::read_to_string(&file)?;
    let program: Program = serde_json::from_str(&source)?;

    if build_args.dump_ast {
        info!("Parsed AST:\n{:#?}", program);
    }

    info!("lowering to C99");
    let c_source = uya::codegen::generate(&program, !build_args.no_line_directives)?;

    match build_args.output {
        Some(output) => {
            fs::write(&output, c_source)?;
            info!("wrote {}", output.display());
        }
        None => {
            std::io::stdout().write_all(c_source.as_bytes())?;
        }
    }

    Ok(())
}
