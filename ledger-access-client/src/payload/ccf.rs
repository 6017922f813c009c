use super::{
    Composite, CompositeKind, IntegerType, PathDomain, PayloadError, Value,
};
use crate::model::{Address, ADDRESS_LEN};
use ciborium::value::Value as Cbor;
use std::collections::HashMap;

const TAG_POSITIVE_BIGNUM: u64 = 2;
const TAG_NEGATIVE_BIGNUM: u64 = 3;

const TAG_TYPEDEF_AND_VALUE: u64 = 129;
const TAG_TYPE_AND_VALUE: u64 = 130;

const TAG_TYPE_REF: u64 = 136;
const TAG_SIMPLE_TYPE: u64 = 137;
const TAG_OPTIONAL_TYPE: u64 = 138;
const TAG_VARSIZED_ARRAY_TYPE: u64 = 139;
const TAG_CONSTSIZED_ARRAY_TYPE: u64 = 140;
const TAG_DICT_TYPE: u64 = 141;

const TAG_STRUCT_TYPE: u64 = 160;
const TAG_RESOURCE_TYPE: u64 = 161;
const TAG_EVENT_TYPE: u64 = 162;
const TAG_CONTRACT_TYPE: u64 = 163;
const TAG_ENUM_TYPE: u64 = 164;

/// Identifiers of the simple (non-parameterized) types.
mod simple {
    pub const BOOL: u64 = 0;
    pub const STRING: u64 = 1;
    pub const CHARACTER: u64 = 2;
    pub const ADDRESS: u64 = 3;
    pub const INT: u64 = 4;
    pub const WORD64: u64 = 21;
    pub const FIX64: u64 = 22;
    pub const UFIX64: u64 = 23;
    pub const PATH: u64 = 24;
    pub const PRIVATE_PATH: u64 = 28;
    pub const VOID: u64 = 50;
}

const INTEGER_TYPES: [IntegerType; 18] = [
    IntegerType::Int,
    IntegerType::Int8,
    IntegerType::Int16,
    IntegerType::Int32,
    IntegerType::Int64,
    IntegerType::Int128,
    IntegerType::Int256,
    IntegerType::UInt,
    IntegerType::UInt8,
    IntegerType::UInt16,
    IntegerType::UInt32,
    IntegerType::UInt64,
    IntegerType::UInt128,
    IntegerType::UInt256,
    IntegerType::Word8,
    IntegerType::Word16,
    IntegerType::Word32,
    IntegerType::Word64,
];

#[derive(Debug, Clone)]
enum CcfType {
    Simple(u64),
    Optional(Box<CcfType>),
    Array(Box<CcfType>),
    Dictionary(Box<CcfType>, Box<CcfType>),
    Ref(Vec<u8>),
}

#[derive(Debug)]
struct CompositeDef {
    kind: CompositeKind,
    type_id: String,
    fields: Vec<(String, CcfType)>,
}

pub(super) fn decode(payload: &[u8]) -> Result<Value, PayloadError> {
    let message: Cbor = ciborium::de::from_reader(payload)
        .map_err(|e| PayloadError::Cbor(format!("{e:?}")))?;

    let mut decoder = Decoder::default();
    match message {
        Cbor::Tag(TAG_TYPEDEF_AND_VALUE, content) => {
            let (typedefs, type_and_value) = into_pair(*content, "typedef-and-value message")?;
            decoder.register_typedefs(typedefs)?;
            decoder.decode_type_and_value(type_and_value)
        }
        Cbor::Tag(TAG_TYPE_AND_VALUE, content) => decoder.decode_type_and_value(*content),
        other => Err(unexpected("message", &other)),
    }
}

#[derive(Default)]
struct Decoder {
    typedefs: HashMap<Vec<u8>, CompositeDef>,
}

impl Decoder {
    fn register_typedefs(&mut self, typedefs: Cbor) -> Result<(), PayloadError> {
        for typedef in into_array(typedefs, "typedef list")? {
            let (tag, content) = match typedef {
                Cbor::Tag(tag, content) => (tag, *content),
                other => return Err(unexpected("composite typedef", &other)),
            };
            let kind = match tag {
                TAG_STRUCT_TYPE => CompositeKind::Struct,
                TAG_RESOURCE_TYPE => CompositeKind::Resource,
                TAG_EVENT_TYPE => CompositeKind::Event,
                TAG_CONTRACT_TYPE => CompositeKind::Contract,
                TAG_ENUM_TYPE => CompositeKind::Enum,
                other => return Err(PayloadError::UnsupportedType(format!("typedef tag {other}"))),
            };

            let mut parts = into_array(content, "composite typedef")?.into_iter();
            let (Some(id), Some(type_id), Some(fields), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(PayloadError::Cbor(
                    "composite typedef must have three elements".to_string(),
                ));
            };

            let id = into_bytes(id, "type id")?;
            let type_id = into_text(type_id, "cadence type id")?;
            let fields = into_array(fields, "field list")?
                .into_iter()
                .map(|field| {
                    let (name, ty) = into_pair(field, "field")?;
                    Ok((into_text(name, "field name")?, parse_type(ty)?))
                })
                .collect::<Result<Vec<_>, PayloadError>>()?;

            self.typedefs.insert(
                id,
                CompositeDef {
                    kind,
                    type_id,
                    fields,
                },
            );
        }
        Ok(())
    }

    fn decode_type_and_value(&self, item: Cbor) -> Result<Value, PayloadError> {
        let (ty, value) = into_pair(item, "type-and-value")?;
        let ty = parse_type(ty)?;
        self.decode_value(&ty, value)
    }

    fn decode_value(&self, ty: &CcfType, item: Cbor) -> Result<Value, PayloadError> {
        // Values of abstract static types carry their concrete type inline.
        if let Cbor::Tag(TAG_TYPE_AND_VALUE, content) = item {
            return self.decode_type_and_value(*content);
        }

        match ty {
            CcfType::Simple(id) => decode_simple(*id, item),
            CcfType::Optional(inner) => match item {
                Cbor::Null => Ok(Value::Optional(None)),
                item => Ok(Value::Optional(Some(Box::new(
                    self.decode_value(inner, item)?,
                )))),
            },
            CcfType::Array(element) => into_array(item, "array value")?
                .into_iter()
                .map(|item| self.decode_value(element, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            CcfType::Dictionary(key_ty, value_ty) => {
                let items = into_array(item, "dictionary value")?;
                if items.len() % 2 != 0 {
                    return Err(PayloadError::Cbor(
                        "dictionary value must hold key/value pairs".to_string(),
                    ));
                }
                let mut pairs = Vec::with_capacity(items.len() / 2);
                let mut items = items.into_iter();
                while let (Some(key), Some(value)) = (items.next(), items.next()) {
                    pairs.push((
                        self.decode_value(key_ty, key)?,
                        self.decode_value(value_ty, value)?,
                    ));
                }
                Ok(Value::Dictionary(pairs))
            }
            CcfType::Ref(id) => {
                let def = self
                    .typedefs
                    .get(id)
                    .ok_or_else(|| PayloadError::UnknownTypeRef(hex::encode(id)))?;
                let values = into_array(item, "composite value")?;
                if values.len() != def.fields.len() {
                    return Err(PayloadError::Cbor(format!(
                        "{} expects {} fields, got {}",
                        def.type_id,
                        def.fields.len(),
                        values.len()
                    )));
                }
                let fields = def
                    .fields
                    .iter()
                    .zip(values)
                    .map(|((name, ty), value)| Ok((name.clone(), self.decode_value(ty, value)?)))
                    .collect::<Result<Vec<_>, PayloadError>>()?;
                Ok(Value::Composite(Composite {
                    kind: def.kind,
                    type_id: def.type_id.clone(),
                    fields,
                }))
            }
        }
    }
}

fn parse_type(item: Cbor) -> Result<CcfType, PayloadError> {
    let (tag, content) = match item {
        Cbor::Tag(tag, content) => (tag, *content),
        other => return Err(unexpected("type", &other)),
    };
    match tag {
        TAG_SIMPLE_TYPE => Ok(CcfType::Simple(into_u64(content, "simple type id")?)),
        TAG_TYPE_REF => Ok(CcfType::Ref(into_bytes(content, "type reference")?)),
        TAG_OPTIONAL_TYPE => Ok(CcfType::Optional(Box::new(parse_type(content)?))),
        TAG_VARSIZED_ARRAY_TYPE => Ok(CcfType::Array(Box::new(parse_type(content)?))),
        TAG_CONSTSIZED_ARRAY_TYPE => {
            let (_size, element) = into_pair(content, "constant-sized array type")?;
            Ok(CcfType::Array(Box::new(parse_type(element)?)))
        }
        TAG_DICT_TYPE => {
            let (key, value) = into_pair(content, "dictionary type")?;
            Ok(CcfType::Dictionary(
                Box::new(parse_type(key)?),
                Box::new(parse_type(value)?),
            ))
        }
        other => Err(PayloadError::UnsupportedType(format!("type tag {other}"))),
    }
}

fn decode_simple(id: u64, item: Cbor) -> Result<Value, PayloadError> {
    match id {
        simple::BOOL => match item {
            Cbor::Bool(b) => Ok(Value::Bool(b)),
            other => Err(unexpected("Bool", &other)),
        },
        simple::STRING => Ok(Value::String(into_text(item, "String")?)),
        simple::CHARACTER => Ok(Value::Character(into_text(item, "Character")?)),
        simple::ADDRESS => {
            let bytes = into_bytes(item, "Address")?;
            if bytes.len() > ADDRESS_LEN {
                return Err(PayloadError::InvalidValue {
                    ty: "Address".to_string(),
                    value: hex::encode(bytes),
                });
            }
            Ok(Value::Address(Address::from_slice(&bytes)))
        }
        simple::INT..=simple::WORD64 => {
            let ty = INTEGER_TYPES[(id - simple::INT) as usize];
            let literal = integer_literal(item, ty.name())?;
            Ok(Value::Integer {
                ty,
                value: ty.validate(&literal)?,
            })
        }
        simple::FIX64 => {
            let literal = integer_literal(item, "Fix64")?;
            literal
                .parse()
                .map(Value::Fix64)
                .map_err(|_| PayloadError::InvalidValue {
                    ty: "Fix64".to_string(),
                    value: literal,
                })
        }
        simple::UFIX64 => {
            let literal = integer_literal(item, "UFix64")?;
            literal
                .parse()
                .map(Value::UFix64)
                .map_err(|_| PayloadError::InvalidValue {
                    ty: "UFix64".to_string(),
                    value: literal,
                })
        }
        simple::PATH..=simple::PRIVATE_PATH => {
            let (domain, identifier) = into_pair(item, "Path")?;
            let code = into_u64(domain, "path domain")?;
            let domain = PathDomain::from_code(code).ok_or_else(|| PayloadError::InvalidValue {
                ty: "PathDomain".to_string(),
                value: code.to_string(),
            })?;
            Ok(Value::Path {
                domain,
                identifier: into_text(identifier, "path identifier")?,
            })
        }
        simple::VOID => match item {
            Cbor::Null => Ok(Value::Void),
            other => Err(unexpected("Void", &other)),
        },
        other => Err(PayloadError::UnsupportedType(format!("simple type {other}"))),
    }
}

/// Renders a CBOR integer or bignum as a decimal literal.
fn integer_literal(item: Cbor, what: &str) -> Result<String, PayloadError> {
    match item {
        Cbor::Integer(i) => Ok(i128::from(i).to_string()),
        Cbor::Tag(TAG_POSITIVE_BIGNUM, content) => {
            Ok(bignum_to_decimal(&into_bytes(*content, what)?))
        }
        Cbor::Tag(TAG_NEGATIVE_BIGNUM, content) => {
            // A negative bignum n encodes the value -1 - n.
            let mut magnitude = into_bytes(*content, what)?;
            increment(&mut magnitude);
            Ok(format!("-{}", bignum_to_decimal(&magnitude)))
        }
        other => Err(unexpected(what, &other)),
    }
}

fn bignum_to_decimal(bytes: &[u8]) -> String {
    // Little-endian base-10 digits.
    let mut digits: Vec<u8> = Vec::new();
    for &byte in bytes {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            let v = u32::from(*digit) * 256 + carry;
            *digit = (v % 10) as u8;
            carry = v / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }
    if digits.is_empty() {
        return "0".to_string();
    }
    digits.iter().rev().map(|d| char::from(b'0' + d)).collect()
}

fn increment(bytes: &mut Vec<u8>) {
    for byte in bytes.iter_mut().rev() {
        if *byte == u8::MAX {
            *byte = 0;
        } else {
            *byte += 1;
            return;
        }
    }
    bytes.insert(0, 1);
}

fn into_array(item: Cbor, what: &str) -> Result<Vec<Cbor>, PayloadError> {
    match item {
        Cbor::Array(items) => Ok(items),
        other => Err(unexpected(what, &other)),
    }
}

fn into_pair(item: Cbor, what: &str) -> Result<(Cbor, Cbor), PayloadError> {
    let mut items = into_array(item, what)?.into_iter();
    match (items.next(), items.next(), items.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        _ => Err(PayloadError::Cbor(format!("{what} must have two elements"))),
    }
}

fn into_bytes(item: Cbor, what: &str) -> Result<Vec<u8>, PayloadError> {
    match item {
        Cbor::Bytes(bytes) => Ok(bytes),
        other => Err(unexpected(what, &other)),
    }
}

fn into_text(item: Cbor, what: &str) -> Result<String, PayloadError> {
    match item {
        Cbor::Text(text) => Ok(text),
        other => Err(unexpected(what, &other)),
    }
}

fn into_u64(item: Cbor, what: &str) -> Result<u64, PayloadError> {
    match item {
        Cbor::Integer(i) => u64::try_from(i).map_err(|_| PayloadError::InvalidValue {
            ty: what.to_string(),
            value: i128::from(i).to_string(),
        }),
        other => Err(unexpected(what, &other)),
    }
}

fn unexpected(what: &str, item: &Cbor) -> PayloadError {
    let found = match item {
        Cbor::Integer(_) => "integer",
        Cbor::Bytes(_) => "byte string",
        Cbor::Float(_) => "float",
        Cbor::Text(_) => "text string",
        Cbor::Bool(_) => "bool",
        Cbor::Null => "null",
        Cbor::Tag(..) => "tag",
        Cbor::Array(_) => "array",
        Cbor::Map(_) => "map",
        _ => "unknown item",
    };
    PayloadError::Cbor(format!("expected {what}, found {found}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::value::Integer;

    fn tag(tag: u64, content: Cbor) -> Cbor {
        Cbor::Tag(tag, Box::new(content))
    }

    fn simple_type(id: u64) -> Cbor {
        tag(TAG_SIMPLE_TYPE, Cbor::Integer(Integer::from(id)))
    }

    fn int(v: i64) -> Cbor {
        Cbor::Integer(Integer::from(v))
    }

    fn encode(message: &Cbor) -> Vec<u8> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(message, &mut bytes).unwrap();
        bytes
    }

    fn event_message() -> Cbor {
        let type_ref = vec![0u8];
        let typedef = tag(
            TAG_EVENT_TYPE,
            Cbor::Array(vec![
                Cbor::Bytes(type_ref.clone()),
                Cbor::Text("A.0000000000000001.Token.Minted".to_string()),
                Cbor::Array(vec![
                    Cbor::Array(vec![Cbor::Text("amount".into()), simple_type(simple::UFIX64)]),
                    Cbor::Array(vec![
                        Cbor::Text("to".into()),
                        tag(TAG_OPTIONAL_TYPE, simple_type(simple::ADDRESS)),
                    ]),
                    Cbor::Array(vec![
                        Cbor::Text("tags".into()),
                        tag(
                            TAG_DICT_TYPE,
                            Cbor::Array(vec![simple_type(simple::STRING), simple_type(8)]),
                        ),
                    ]),
                ]),
            ]),
        );
        tag(
            TAG_TYPEDEF_AND_VALUE,
            Cbor::Array(vec![
                Cbor::Array(vec![typedef]),
                Cbor::Array(vec![
                    tag(TAG_TYPE_REF, Cbor::Bytes(type_ref)),
                    Cbor::Array(vec![
                        int(150_000_000),
                        Cbor::Bytes(vec![0, 0, 0, 0, 0, 0, 0, 2]),
                        Cbor::Array(vec![Cbor::Text("a".into()), int(-4)]),
                    ]),
                ]),
            ]),
        )
    }

    #[test]
    fn decodes_event_with_typedef() {
        let value = decode(&encode(&event_message())).unwrap();
        let event = value.as_composite().unwrap();

        assert_eq!(event.kind, CompositeKind::Event);
        assert_eq!(event.type_id, "A.0000000000000001.Token.Minted");
        assert_eq!(event.field("amount"), Some(&Value::UFix64(150_000_000)));
        assert_eq!(
            event.field("to"),
            Some(&Value::Optional(Some(Box::new(Value::Address(
                Address::from_hex("0x2").unwrap()
            )))))
        );
        assert_eq!(
            event.field("tags"),
            Some(&Value::Dictionary(vec![(
                Value::String("a".into()),
                Value::Integer {
                    ty: IntegerType::Int64,
                    value: "-4".into()
                }
            )]))
        );
    }

    #[test]
    fn decodes_bignums_and_inline_types() {
        let message = tag(
            TAG_TYPE_AND_VALUE,
            Cbor::Array(vec![
                tag(TAG_VARSIZED_ARRAY_TYPE, simple_type(39)),
                Cbor::Array(vec![
                    tag(
                        TAG_TYPE_AND_VALUE,
                        Cbor::Array(vec![
                            simple_type(17),
                            tag(TAG_POSITIVE_BIGNUM, Cbor::Bytes(vec![1, 0])),
                        ]),
                    ),
                    tag(
                        TAG_TYPE_AND_VALUE,
                        Cbor::Array(vec![
                            simple_type(simple::INT),
                            tag(TAG_NEGATIVE_BIGNUM, Cbor::Bytes(vec![0, 0xff])),
                        ]),
                    ),
                ]),
            ]),
        );

        let value = decode(&encode(&message)).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Integer {
                    ty: IntegerType::UInt256,
                    value: "256".into()
                },
                Value::Integer {
                    ty: IntegerType::Int,
                    value: "-256".into()
                },
            ])
        );
    }

    #[test]
    fn corrupted_payload_is_rejected() {
        let mut bytes = encode(&event_message());
        bytes[0] = b'x';
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn unknown_type_reference_is_rejected() {
        let message = tag(
            TAG_TYPE_AND_VALUE,
            Cbor::Array(vec![
                tag(TAG_TYPE_REF, Cbor::Bytes(vec![7])),
                Cbor::Array(vec![]),
            ]),
        );
        assert_eq!(
            decode(&encode(&message)).unwrap_err(),
            PayloadError::UnknownTypeRef("07".to_string())
        );
    }

    #[test]
    fn bignum_conversion() {
        assert_eq!(bignum_to_decimal(&[]), "0");
        assert_eq!(bignum_to_decimal(&[0xff, 0xff]), "65535");
        let mut bytes = vec![0xff];
        increment(&mut bytes);
        assert_eq!(bytes, vec![1, 0]);
    }
}
