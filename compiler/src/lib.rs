//! skiff-thrift-compiler
//!
//! This crate implements:
//!  1) A tokenizer for `.thrift` IDL files,
//!  2) A single-pass parser whose semantic actions build the schema model
//!     directly (constants, typedefs, enums, struct-likes, services),
//!  3) Validation/casting of constant literals against declared types,
//!  4) An include loader with a module cache and cycle detection,
//!  5) Error types (`ThriftError`).

pub mod cast;
pub mod error;
pub mod loader;
pub mod tokenizer;
pub mod utils;

mod parser;

pub use error::ThriftError;
pub use loader::Loader;

use std::path::Path;
use std::rc::Rc;

use skiff_thrift_schema::Module;

/// Parse one `.thrift` file. `module_name`, when given, must end in
/// `_thrift` and defaults to the file stem; `include_dir` is the base for
/// resolving include statements and defaults to the current directory.
pub fn parse(
    path: &Path,
    module_name: Option<&str>,
    include_dir: Option<&Path>,
) -> Result<Rc<Module>, ThriftError> {
    let mut loader = match include_dir {
        Some(dir) => Loader::with_include_dir(dir),
        None => Loader::new(),
    };
    loader.load_named(path, module_name)
}

/// Parse one `.thrift` file with default settings: the module is named after
/// the file stem and includes resolve against the current directory.
pub fn parse_file(path: &Path) -> Result<Rc<Module>, ThriftError> {
    Loader::new().load(path)
}

/// Parse in-memory IDL source as a module named `module_name`.
pub fn parse_source(text: &str, module_name: &str) -> Result<Module, ThriftError> {
    Loader::new().load_source(text, module_name)
}
