//! In-memory schema model produced by parsing Thrift IDL files.
//!
//! The model is plain data: descriptors for structs, unions, exceptions,
//! enums, services and typed constants, grouped into a [`Module`] per parsed
//! file. Encoders and RPC stubs consume these descriptors; nothing in this
//! crate reads source text.
//!
//! ```
//! use skiff_thrift_schema::*;
//!
//! let def = StructDef::new("Point", StructKind::Struct, vec![
//!     FieldDef { id: 1, required: true, ty: TypeTag::Double, name: "x".to_owned(), default: None },
//!     FieldDef { id: 2, required: true, ty: TypeTag::Double, name: "y".to_owned(), default: None },
//! ]);
//! assert_eq!(def.field_by_id(1).unwrap().name, "x");
//! assert_eq!(def.field_by_name("y").unwrap().id, 2);
//! ```

pub mod module;
pub mod schema;
pub mod value;

pub use module::*;
pub use schema::*;
pub use value::*;

// Wire codes for the type tags, matching the Thrift binary protocol.
// Binary shares the string code; enums travel as i32.
pub const TTYPE_STOP: i8 = 0;
pub const TTYPE_VOID: i8 = 1;
pub const TTYPE_BOOL: i8 = 2;
pub const TTYPE_BYTE: i8 = 3;
pub const TTYPE_DOUBLE: i8 = 4;
pub const TTYPE_I16: i8 = 6;
pub const TTYPE_I32: i8 = 8;
pub const TTYPE_I64: i8 = 10;
pub const TTYPE_STRING: i8 = 11;
pub const TTYPE_BINARY: i8 = 11;
pub const TTYPE_STRUCT: i8 = 12;
pub const TTYPE_MAP: i8 = 13;
pub const TTYPE_SET: i8 = 14;
pub const TTYPE_LIST: i8 = 15;
