//! skiff-thrift
//!
//! Facade crate for the Skiff Thrift IDL front-end.
//!
//! - Schema model types (re-exported from `skiff-thrift-schema`)
//! - Parser entry points (re-exported from `skiff-thrift-compiler`)
//! - JSON dumping of parsed modules

pub use skiff_thrift_compiler::error::ThriftError;
pub use skiff_thrift_compiler::{parse, parse_file, parse_source, Loader};
pub use skiff_thrift_schema::{
    EnumDef, FieldDef, Method, Module, Record, ServiceDef, StructDef, StructKind, Symbol, TypeTag,
    Value,
};

/// Render a parsed module as pretty-printed JSON.
pub fn module_to_json(module: &Module) -> String {
    serde_json::to_string_pretty(module).unwrap()
}

pub mod error {
    pub use skiff_thrift_compiler::error::ThriftError;
}

pub mod schema {
    pub use skiff_thrift_schema::*;
}
