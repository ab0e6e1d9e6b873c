use skiff_thrift_schema::{StructDef, TypeTag, Value};

use crate::error::ThriftError;

/// Check a literal against its declared type, transforming containers and
/// struct literals on the way through. Primitives must match the declared
/// kind exactly; there is no cross-kind coercion.
pub fn cast_value(ty: &TypeTag, value: Value, line: usize) -> Result<Value, ThriftError> {
    match ty {
        TypeTag::Bool => match value {
            Value::Bool(_) => Ok(value),
            other => mismatch(ty, &other, line),
        },
        TypeTag::Byte | TypeTag::I16 | TypeTag::I32 | TypeTag::I64 => match value {
            Value::Int(_) => Ok(value),
            other => mismatch(ty, &other, line),
        },
        TypeTag::Double => match value {
            Value::Double(_) => Ok(value),
            other => mismatch(ty, &other, line),
        },
        TypeTag::String | TypeTag::Binary => match value {
            Value::String(_) => Ok(value),
            other => mismatch(ty, &other, line),
        },
        TypeTag::List(el) => match value {
            Value::List(items) => {
                let items = items
                    .into_iter()
                    .map(|item| cast_value(el, item, line))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(items))
            }
            other => mismatch(ty, &other, line),
        },
        TypeTag::Set(el) => match value {
            // a set literal arrives as a list; a reference to an earlier
            // set constant is already deduplicated
            Value::List(items) | Value::Set(items) => {
                let mut out: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    let item = cast_value(el, item, line)?;
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
                Ok(Value::Set(out))
            }
            other => mismatch(ty, &other, line),
        },
        TypeTag::Map(key_ty, val_ty) => match value {
            Value::Map(entries) => {
                let mut out: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
                for (key, val) in entries {
                    let key = cast_value(key_ty, key, line)?;
                    let val = cast_value(val_ty, val, line)?;
                    match out.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(entry) => entry.1 = val,
                        None => out.push((key, val)),
                    }
                }
                Ok(Value::Map(out))
            }
            other => mismatch(ty, &other, line),
        },
        TypeTag::Enum(def) => match value {
            Value::Int(v) if def.has_value(v) => Ok(Value::Int(v)),
            Value::Int(v) => Err(ThriftError::InvalidEnumValue {
                name: def.name.clone(),
                value: v,
            }),
            other => mismatch(ty, &other, line),
        },
        TypeTag::Struct(def) => cast_struct(def, value, line),
    }
}

fn cast_struct(def: &StructDef, value: Value, line: usize) -> Result<Value, ThriftError> {
    match value {
        // a reference to an already-built constant of the same type
        Value::Struct(rec) if rec.type_name == def.name => Ok(Value::Struct(rec)),
        Value::Map(entries) => {
            for field in def.fields.iter().filter(|f| f.required) {
                let present = entries
                    .iter()
                    .any(|(key, _)| matches!(key, Value::String(name) if name == &field.name));
                if !present {
                    return Err(ThriftError::MissingRequiredField {
                        field: field.name.clone(),
                        ty: def.name.clone(),
                    });
                }
            }

            let mut given = Vec::with_capacity(entries.len());
            for (key, val) in entries {
                let name = match key {
                    Value::String(name) => name,
                    other => {
                        return Err(ThriftError::TypeMismatch {
                            expected: "string field name".to_owned(),
                            found: other.kind_name().to_owned(),
                            line,
                        })
                    }
                };
                let field = def.field_by_name(&name).ok_or_else(|| ThriftError::UnknownField {
                    field: name.clone(),
                    ty: def.name.clone(),
                })?;
                let val = cast_value(&field.ty, val, line)?;
                given.push((name, val));
            }
            Ok(Value::Struct(def.instantiate(&given)))
        }
        other => Err(ThriftError::TypeMismatch {
            expected: def.name.clone(),
            found: other.kind_name().to_owned(),
            line,
        }),
    }
}

fn mismatch(ty: &TypeTag, value: &Value, line: usize) -> Result<Value, ThriftError> {
    Err(ThriftError::TypeMismatch {
        expected: ty.to_string(),
        found: value.kind_name().to_owned(),
        line,
    })
}
