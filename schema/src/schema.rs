use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::value::{Record, Value};
use crate::{
    TTYPE_BINARY, TTYPE_BOOL, TTYPE_BYTE, TTYPE_DOUBLE, TTYPE_I16, TTYPE_I32, TTYPE_I64,
    TTYPE_LIST, TTYPE_MAP, TTYPE_SET, TTYPE_STRING, TTYPE_STRUCT,
};

/// A resolved field or constant type.
///
/// Named references carry the descriptor they resolved to, so consumers never
/// have to look names up again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeTag {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List(Box<TypeTag>),
    Set(Box<TypeTag>),
    Map(Box<TypeTag>, Box<TypeTag>),
    Enum(Rc<EnumDef>),
    Struct(Rc<StructDef>),
}

impl TypeTag {
    /// The Thrift wire code for this tag. Enums are i32-backed.
    pub fn code(&self) -> i8 {
        match self {
            TypeTag::Bool => TTYPE_BOOL,
            TypeTag::Byte => TTYPE_BYTE,
            TypeTag::I16 => TTYPE_I16,
            TypeTag::I32 => TTYPE_I32,
            TypeTag::I64 => TTYPE_I64,
            TypeTag::Double => TTYPE_DOUBLE,
            TypeTag::String => TTYPE_STRING,
            TypeTag::Binary => TTYPE_BINARY,
            TypeTag::List(_) => TTYPE_LIST,
            TypeTag::Set(_) => TTYPE_SET,
            TypeTag::Map(_, _) => TTYPE_MAP,
            TypeTag::Enum(_) => TTYPE_I32,
            TypeTag::Struct(_) => TTYPE_STRUCT,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Byte => write!(f, "byte"),
            TypeTag::I16 => write!(f, "i16"),
            TypeTag::I32 => write!(f, "i32"),
            TypeTag::I64 => write!(f, "i64"),
            TypeTag::Double => write!(f, "double"),
            TypeTag::String => write!(f, "string"),
            TypeTag::Binary => write!(f, "binary"),
            TypeTag::List(el) => write!(f, "list<{}>", el),
            TypeTag::Set(el) => write!(f, "set<{}>", el),
            TypeTag::Map(k, v) => write!(f, "map<{}, {}>", k, v),
            TypeTag::Enum(e) => write!(f, "{}", e.name),
            TypeTag::Struct(s) => write!(f, "{}", s.name),
        }
    }
}

/// Which declaration keyword produced a [`StructDef`]. All three share one
/// shape; exceptions keep the tag so stubs can raise them as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StructKind {
    Struct,
    Union,
    Exception,
}

/// One declared field. Ids are author-supplied and not checked for
/// uniqueness; unmarked fields are not required.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub id: i32,
    pub required: bool,
    pub ty: TypeTag,
    pub name: String,
    pub default: Option<Value>,
}

/// Descriptor for a struct, union or exception declaration, or for a
/// synthesized method envelope.
#[derive(Debug, PartialEq, Serialize)]
pub struct StructDef {
    pub name: String,
    pub kind: StructKind,
    pub fields: Vec<FieldDef>,
    #[serde(skip)]
    by_id: HashMap<i32, usize>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl StructDef {
    /// Build a descriptor from fields in declaration order, indexing them by
    /// id and by name. A repeated id or name overwrites the earlier index
    /// entry; the field list itself keeps every declaration.
    pub fn new(name: impl Into<String>, kind: StructKind, fields: Vec<FieldDef>) -> Self {
        let mut by_id = HashMap::with_capacity(fields.len());
        let mut by_name = HashMap::with_capacity(fields.len());
        for (pos, field) in fields.iter().enumerate() {
            by_id.insert(field.id, pos);
            by_name.insert(field.name.clone(), pos);
        }
        StructDef {
            name: name.into(),
            kind,
            fields,
            by_id,
            by_name,
        }
    }

    pub fn field_by_id(&self, id: i32) -> Option<&FieldDef> {
        self.by_id.get(&id).map(|&pos| &self.fields[pos])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.by_name.get(name).map(|&pos| &self.fields[pos])
    }

    /// Declared defaults, aligned to declaration order.
    pub fn default_spec(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.default.as_ref()))
    }

    /// Keyword-style construction: the given values are reordered to
    /// declaration order and absent fields fall back to their declared
    /// default, if any. Callers are expected to have validated the names.
    pub fn instantiate(&self, given: &[(String, Value)]) -> Record {
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if let Some((_, value)) = given.iter().find(|(name, _)| name == &field.name) {
                values.push((field.name.clone(), value.clone()));
            } else if let Some(default) = &field.default {
                values.push((field.name.clone(), default.clone()));
            }
        }
        Record {
            type_name: self.name.clone(),
            values,
        }
    }
}

/// Descriptor for an enum declaration. Members hold their final integer
/// values after auto-numbering; `values` is the set actually in use.
#[derive(Debug, PartialEq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<(String, i64)>,
    pub values: BTreeSet<i64>,
}

impl EnumDef {
    /// Resolve auto-numbered members: an unlabeled member takes its
    /// predecessor's value plus one, starting from zero.
    pub fn build(name: impl Into<String>, members: Vec<(String, Option<i64>)>) -> Self {
        let mut resolved = Vec::with_capacity(members.len());
        let mut values = BTreeSet::new();
        let mut prev = -1i64;
        for (member, explicit) in members {
            let value = explicit.unwrap_or(prev + 1);
            prev = value;
            values.insert(value);
            resolved.push((member, value));
        }
        EnumDef {
            name: name.into(),
            members: resolved,
            values,
        }
    }

    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(name, _)| name == member)
            .map(|&(_, value)| value)
    }

    pub fn has_value(&self, value: i64) -> bool {
        self.values.contains(&value)
    }
}

/// One service method with its synthesized call envelopes.
#[derive(Debug, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub oneway: bool,
    /// `<name>_args`: the declared parameters.
    pub args: Rc<StructDef>,
    /// `<name>_result`: field 0 `success` when the return type is not void,
    /// then one optional field per declared throws entry.
    pub result: Rc<StructDef>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        oneway: bool,
        return_ty: Option<TypeTag>,
        params: Vec<FieldDef>,
        throws: Vec<FieldDef>,
    ) -> Self {
        let name = name.into();
        let args = StructDef::new(format!("{}_args", name), StructKind::Struct, params);

        let mut result_fields = Vec::with_capacity(throws.len() + 1);
        if let Some(ty) = return_ty {
            result_fields.push(FieldDef {
                id: 0,
                required: false,
                ty,
                name: "success".to_owned(),
                default: None,
            });
        }
        for mut field in throws {
            field.required = false;
            result_fields.push(field);
        }
        let result = StructDef::new(format!("{}_result", name), StructKind::Struct, result_fields);

        Method {
            name,
            oneway,
            args: Rc::new(args),
            result: Rc::new(result),
        }
    }
}

/// Descriptor for a service declaration. Inherited methods stay reachable
/// through the parent reference rather than being copied down.
#[derive(Debug, PartialEq, Serialize)]
pub struct ServiceDef {
    pub name: String,
    pub extends: Option<Rc<ServiceDef>>,
    pub methods: Vec<Method>,
}

impl ServiceDef {
    pub fn new(
        name: impl Into<String>,
        extends: Option<Rc<ServiceDef>>,
        methods: Vec<Method>,
    ) -> Self {
        ServiceDef {
            name: name.into(),
            extends,
            methods,
        }
    }

    /// Look a method up on this service, falling back to the parent chain.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .or_else(|| self.extends.as_ref().and_then(|p| p.method(name)))
    }

    /// Names of the methods declared on this service, in declaration order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }

    /// The full method set: parent's methods first, then this service's own.
    pub fn all_method_names(&self) -> Vec<&str> {
        let mut names = match &self.extends {
            Some(parent) => parent.all_method_names(),
            None => Vec::new(),
        };
        names.extend(self.method_names());
        names
    }
}
