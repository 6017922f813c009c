use super::{
    parse_fixed_point, Composite, CompositeKind, IntegerType, PathDomain, PayloadError, Value,
};
use crate::model::Address;
use serde_json::{Map, Value as Json};

pub(super) fn decode(payload: &[u8]) -> Result<Value, PayloadError> {
    let json: Json =
        serde_json::from_slice(payload).map_err(|e| PayloadError::Json(e.to_string()))?;
    decode_value(&json)
}

fn decode_value(json: &Json) -> Result<Value, PayloadError> {
    let object = as_object(json)?;
    let ty = object
        .get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| PayloadError::Json("value object without a type".to_string()))?;
    let value = object.get("value").unwrap_or(&Json::Null);

    if let Some(int_ty) = IntegerType::from_name(ty) {
        let literal = as_str(value, ty)?;
        return Ok(Value::Integer {
            ty: int_ty,
            value: int_ty.validate(literal)?,
        });
    }
    if let Some(kind) = CompositeKind::from_name(ty) {
        return decode_composite(kind, value);
    }

    match ty {
        "Void" => Ok(Value::Void),
        "Optional" => match value {
            Json::Null => Ok(Value::Optional(None)),
            inner => Ok(Value::Optional(Some(Box::new(decode_value(inner)?)))),
        },
        "Bool" => value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| invalid(ty, value)),
        "String" => Ok(Value::String(as_str(value, ty)?.to_string())),
        "Character" => Ok(Value::Character(as_str(value, ty)?.to_string())),
        "Address" => decode_address(as_str(value, ty)?),
        "Fix64" => {
            let literal = as_str(value, ty)?;
            parse_fixed_point(literal)
                .and_then(|v| i64::try_from(v).ok())
                .map(Value::Fix64)
                .ok_or_else(|| invalid(ty, value))
        }
        "UFix64" => {
            let literal = as_str(value, ty)?;
            parse_fixed_point(literal)
                .and_then(|v| u64::try_from(v).ok())
                .map(Value::UFix64)
                .ok_or_else(|| invalid(ty, value))
        }
        "Array" => value
            .as_array()
            .ok_or_else(|| invalid(ty, value))?
            .iter()
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        "Dictionary" => {
            let entries = value.as_array().ok_or_else(|| invalid(ty, value))?;
            let mut pairs = Vec::with_capacity(entries.len());
            for entry in entries {
                let entry = as_object(entry)?;
                let key = entry.get("key").ok_or_else(|| invalid(ty, value))?;
                let val = entry.get("value").ok_or_else(|| invalid(ty, value))?;
                pairs.push((decode_value(key)?, decode_value(val)?));
            }
            Ok(Value::Dictionary(pairs))
        }
        "Path" => {
            let path = as_object(value)?;
            let domain = path
                .get("domain")
                .and_then(Json::as_str)
                .and_then(PathDomain::from_name)
                .ok_or_else(|| invalid(ty, value))?;
            let identifier = path
                .get("identifier")
                .and_then(Json::as_str)
                .ok_or_else(|| invalid(ty, value))?;
            Ok(Value::Path {
                domain,
                identifier: identifier.to_string(),
            })
        }
        "Type" => {
            let static_type = as_object(value)?
                .get("staticType")
                .ok_or_else(|| invalid(ty, value))?;
            Ok(Value::Type(type_id(static_type)))
        }
        "Capability" => {
            let capability = as_object(value)?;
            let id = capability
                .get("id")
                .and_then(Json::as_str)
                .unwrap_or_default()
                .to_string();
            let address = capability
                .get("address")
                .and_then(Json::as_str)
                .ok_or_else(|| invalid(ty, value))?;
            let borrow_type = capability
                .get("borrowType")
                .map(type_id)
                .unwrap_or_default();
            Ok(Value::Capability {
                id,
                address: parse_address(address)?,
                borrow_type,
            })
        }
        other => Err(PayloadError::UnsupportedType(other.to_string())),
    }
}

fn decode_composite(kind: CompositeKind, value: &Json) -> Result<Value, PayloadError> {
    let object = as_object(value)?;
    let type_id = object
        .get("id")
        .and_then(Json::as_str)
        .ok_or_else(|| PayloadError::Json("composite without an id".to_string()))?;
    let fields = match object.get("fields") {
        Some(Json::Array(fields)) => fields,
        Some(_) => return Err(PayloadError::Json("composite fields must be a list".to_string())),
        None => return Err(PayloadError::Json("composite without fields".to_string())),
    };

    let mut decoded = Vec::with_capacity(fields.len());
    for field in fields {
        let field = as_object(field)?;
        let name = field
            .get("name")
            .and_then(Json::as_str)
            .ok_or_else(|| PayloadError::Json("field without a name".to_string()))?;
        let value = field
            .get("value")
            .ok_or_else(|| PayloadError::Json(format!("field `{name}` without a value")))?;
        decoded.push((name.to_string(), decode_value(value)?));
    }

    Ok(Value::Composite(Composite {
        kind,
        type_id: type_id.to_string(),
        fields: decoded,
    }))
}

/// Static types are either plain strings or objects keyed by `kind`, with
/// nominal types carrying their `typeID`.
fn type_id(static_type: &Json) -> String {
    match static_type {
        Json::String(s) => s.clone(),
        Json::Object(object) => object
            .get("typeID")
            .or_else(|| object.get("kind"))
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn decode_address(literal: &str) -> Result<Value, PayloadError> {
    parse_address(literal).map(Value::Address)
}

fn parse_address(literal: &str) -> Result<Address, PayloadError> {
    Address::from_hex(literal).map_err(|_| PayloadError::InvalidValue {
        ty: "Address".to_string(),
        value: literal.to_string(),
    })
}

fn as_object(json: &Json) -> Result<&Map<String, Json>, PayloadError> {
    json.as_object()
        .ok_or_else(|| PayloadError::Json(format!("expected an object, got {json}")))
}

fn as_str<'a>(json: &'a Json, ty: &str) -> Result<&'a str, PayloadError> {
    json.as_str().ok_or_else(|| invalid(ty, json))
}

fn invalid(ty: &str, value: &Json) -> PayloadError {
    PayloadError::InvalidValue {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}
