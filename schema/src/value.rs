use serde::Serialize;

/// A validated constant value.
///
/// Shapes mirror the declared [`TypeTag`](crate::TypeTag): all integer widths
/// share `Int`, sets keep first-occurrence order after deduplication, and
/// maps keep entry order with last-write-wins on duplicate keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(Record),
}

impl Value {
    /// A short noun for error messages, e.g. `"integer"` or `"map"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// A convenience method to extract the value out of an [Int](#variant.Int).
    /// Returns `0` for other value kinds.
    pub fn as_int(&self) -> i64 {
        match *self {
            Value::Int(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract the value out of a [Double](#variant.Double).
    /// Returns `0.0` for other value kinds.
    pub fn as_double(&self) -> f64 {
        match *self {
            Value::Double(value) => value,
            _ => 0.0,
        }
    }

    /// A convenience method to extract the value out of a [String](#variant.String).
    /// Returns `""` for other value kinds.
    pub fn as_str(&self) -> &str {
        match *self {
            Value::String(ref value) => value.as_str(),
            _ => "",
        }
    }

    /// A convenience method to get the elements of a [List](#variant.List) or
    /// [Set](#variant.Set). Returns an empty slice for other value kinds.
    pub fn as_slice(&self) -> &[Value] {
        match *self {
            Value::List(ref values) | Value::Set(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to get the entries of a [Map](#variant.Map).
    /// Returns an empty slice for other value kinds.
    pub fn as_entries(&self) -> &[(Value, Value)] {
        match *self {
            Value::Map(ref entries) => entries.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to get the [Record] out of a [Struct](#variant.Struct).
    pub fn as_record(&self) -> Option<&Record> {
        match *self {
            Value::Struct(ref record) => Some(record),
            _ => None,
        }
    }
}

/// A constructed struct/union/exception constant.
///
/// Values sit in declaration order with defaults already filled in; see
/// [`StructDef::instantiate`](crate::StructDef::instantiate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub type_name: String,
    pub values: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}
