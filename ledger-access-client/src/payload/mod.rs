//! # Event Payload Decoding
//!
//! Event payloads travel as opaque bytes inside frames and responses. Their
//! encoding is selected per request with an [`EventEncodingVersion`]:
//!
//! - [`EventEncodingVersion::JsonCdcV0`]: the JSON value interchange format,
//!   where every value is an object of the form `{"type": ..., "value": ...}`.
//! - [`EventEncodingVersion::CcfV0`]: the compact CBOR-based format, where type
//!   information is written once up front and values follow untagged.
//!
//! Both decoders produce the same structured [`Value`], so callers never need
//! to know which encoding the access node used.

mod ccf;
mod json;

use crate::model::Address;
use std::fmt;
use thiserror::Error;

/// The versioned scheme used to serialize event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventEncodingVersion {
    JsonCdcV0,
    #[default]
    CcfV0,
}

impl EventEncodingVersion {
    /// The numeric value used on the wire by the gRPC transport.
    pub fn wire_value(self) -> i32 {
        match self {
            EventEncodingVersion::JsonCdcV0 => 0,
            EventEncodingVersion::CcfV0 => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventEncodingVersion::JsonCdcV0 => "json-cdc-v0",
            EventEncodingVersion::CcfV0 => "ccf-v0",
        }
    }
}

impl fmt::Display for EventEncodingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventEncodingVersion {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "json-cdc-v0" | "json-cdc" | "json" => Ok(EventEncodingVersion::JsonCdcV0),
            "ccf-v0" | "ccf" => Ok(EventEncodingVersion::CcfV0),
            other => Err(PayloadError::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Errors raised while decoding an event payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("unsupported encoding version: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid json-cdc payload: {0}")]
    Json(String),

    #[error("invalid ccf payload: {0}")]
    Cbor(String),

    #[error("unsupported value type: {0}")]
    UnsupportedType(String),

    #[error("invalid {ty} value: {value}")]
    InvalidValue { ty: String, value: String },

    #[error("unknown type reference: 0x{0}")]
    UnknownTypeRef(String),
}

/// Decodes an event payload with the given encoding version.
pub fn decode(payload: &[u8], version: EventEncodingVersion) -> Result<Value, PayloadError> {
    match version {
        EventEncodingVersion::JsonCdcV0 => json::decode(payload),
        EventEncodingVersion::CcfV0 => ccf::decode(payload),
    }
}

/// A decoded structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Optional(Option<Box<Value>>),
    Bool(bool),
    String(String),
    Character(String),
    Address(Address),
    /// An integer of the given type in canonical decimal form.
    Integer { ty: IntegerType, value: String },
    /// A signed fixed-point number, scaled by 10^8.
    Fix64(i64),
    /// An unsigned fixed-point number, scaled by 10^8.
    UFix64(u64),
    Array(Vec<Value>),
    /// Key/value pairs in encoding order.
    Dictionary(Vec<(Value, Value)>),
    Composite(Composite),
    Path { domain: PathDomain, identifier: String },
    Capability {
        id: String,
        address: Address,
        borrow_type: String,
    },
    /// A type value, identified by its type id.
    Type(String),
}

impl Value {
    /// Returns the composite if this value is a struct, resource, event,
    /// contract or enum.
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Value::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Character(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value if it fits into a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Integer { value, .. } => value.parse().ok(),
            Value::UFix64(v) => Some(*v),
            _ => None,
        }
    }
}

/// The kind of a composite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Struct,
    Resource,
    Event,
    Contract,
    Enum,
}

impl CompositeKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Struct" => Some(CompositeKind::Struct),
            "Resource" => Some(CompositeKind::Resource),
            "Event" => Some(CompositeKind::Event),
            "Contract" => Some(CompositeKind::Contract),
            "Enum" => Some(CompositeKind::Enum),
            _ => None,
        }
    }
}

/// A struct, resource, event, contract or enum value with named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub kind: CompositeKind,
    pub type_id: String,
    pub fields: Vec<(String, Value)>,
}

impl Composite {
    /// Looks a field up by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathDomain {
    Storage,
    Public,
    Private,
}

impl PathDomain {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "storage" => Some(PathDomain::Storage),
            "public" => Some(PathDomain::Public),
            "private" => Some(PathDomain::Private),
            _ => None,
        }
    }

    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(PathDomain::Storage),
            2 => Some(PathDomain::Private),
            3 => Some(PathDomain::Public),
            _ => None,
        }
    }
}

/// The integer types a payload may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    UInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Word8,
    Word16,
    Word32,
    Word64,
}

impl IntegerType {
    pub fn name(self) -> &'static str {
        match self {
            IntegerType::Int => "Int",
            IntegerType::Int8 => "Int8",
            IntegerType::Int16 => "Int16",
            IntegerType::Int32 => "Int32",
            IntegerType::Int64 => "Int64",
            IntegerType::Int128 => "Int128",
            IntegerType::Int256 => "Int256",
            IntegerType::UInt => "UInt",
            IntegerType::UInt8 => "UInt8",
            IntegerType::UInt16 => "UInt16",
            IntegerType::UInt32 => "UInt32",
            IntegerType::UInt64 => "UInt64",
            IntegerType::UInt128 => "UInt128",
            IntegerType::UInt256 => "UInt256",
            IntegerType::Word8 => "Word8",
            IntegerType::Word16 => "Word16",
            IntegerType::Word32 => "Word32",
            IntegerType::Word64 => "Word64",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "Int" => IntegerType::Int,
            "Int8" => IntegerType::Int8,
            "Int16" => IntegerType::Int16,
            "Int32" => IntegerType::Int32,
            "Int64" => IntegerType::Int64,
            "Int128" => IntegerType::Int128,
            "Int256" => IntegerType::Int256,
            "UInt" => IntegerType::UInt,
            "UInt8" => IntegerType::UInt8,
            "UInt16" => IntegerType::UInt16,
            "UInt32" => IntegerType::UInt32,
            "UInt64" => IntegerType::UInt64,
            "UInt128" => IntegerType::UInt128,
            "UInt256" => IntegerType::UInt256,
            "Word8" => IntegerType::Word8,
            "Word16" => IntegerType::Word16,
            "Word32" => IntegerType::Word32,
            "Word64" => IntegerType::Word64,
            _ => return None,
        };
        Some(ty)
    }

    fn is_signed(self) -> bool {
        matches!(
            self,
            IntegerType::Int
                | IntegerType::Int8
                | IntegerType::Int16
                | IntegerType::Int32
                | IntegerType::Int64
                | IntegerType::Int128
                | IntegerType::Int256
        )
    }

    /// Inclusive bounds for types that fit into 128 bits; `None` for the
    /// arbitrary-precision and 256-bit types.
    fn bounds(self) -> Option<(i128, u128)> {
        let bounds = match self {
            IntegerType::Int8 => (i8::MIN as i128, i8::MAX as u128),
            IntegerType::Int16 => (i16::MIN as i128, i16::MAX as u128),
            IntegerType::Int32 => (i32::MIN as i128, i32::MAX as u128),
            IntegerType::Int64 => (i64::MIN as i128, i64::MAX as u128),
            IntegerType::Int128 => (i128::MIN, i128::MAX as u128),
            IntegerType::UInt8 | IntegerType::Word8 => (0, u8::MAX as u128),
            IntegerType::UInt16 | IntegerType::Word16 => (0, u16::MAX as u128),
            IntegerType::UInt32 | IntegerType::Word32 => (0, u32::MAX as u128),
            IntegerType::UInt64 | IntegerType::Word64 => (0, u64::MAX as u128),
            IntegerType::UInt128 => (0, u128::MAX),
            _ => return None,
        };
        Some(bounds)
    }

    /// Validates a decimal literal against this type and returns it in
    /// canonical form.
    fn validate(self, literal: &str) -> Result<String, PayloadError> {
        let invalid = || PayloadError::InvalidValue {
            ty: self.name().to_string(),
            value: literal.to_string(),
        };

        let (negative, digits) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let digits = digits.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        let is_zero = digits == "0";
        if negative && !is_zero && !self.is_signed() {
            return Err(invalid());
        }

        if let Some((min, max)) = self.bounds() {
            if negative && !is_zero {
                let value: i128 = format!("-{digits}").parse().map_err(|_| invalid())?;
                if value < min {
                    return Err(invalid());
                }
            } else {
                let value: u128 = digits.parse().map_err(|_| invalid())?;
                if value > max {
                    return Err(invalid());
                }
            }
        }

        if negative && !is_zero {
            Ok(format!("-{digits}"))
        } else {
            Ok(digits.to_string())
        }
    }
}

/// Parses a fixed-point literal with at most eight fractional digits into its
/// value scaled by 10^8.
fn parse_fixed_point(literal: &str) -> Option<i128> {
    const SCALE_DIGITS: usize = 8;

    let (negative, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if integer.is_empty()
        || fraction.len() > SCALE_DIGITS
        || !integer.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let padded = format!("{fraction:0<width$}", width = SCALE_DIGITS);
    let scaled: i128 = format!("{integer}{padded}").parse().ok()?;
    Some(if negative { -scaled } else { scaled })
}
