//! Two-stage CBOR payload codec.
//!
//! Every Fusain payload is a definite-length CBOR array of exactly two
//! elements: `[message_type, inner]`. The message type is an unsigned
//! integer in `0..=255`, always written with the explicit
//! one-octet-argument encoding (`0x18 <byte>`) so the wire form is
//! identical across implementations that might otherwise pick a
//! shorter head. The inner element is either null (empty-payload
//! messages) or a map from non-negative integer keys to a small set of
//! value types.
//!
//! Decoding accepts any CBOR integer head for the message type; only
//! encoding pins the stable form.

use std::collections::BTreeMap;

use ciborium::value::{Integer, Value};

use crate::errors::{EncodeError, PayloadError};

/// CBOR head for a definite-length array of two elements.
const ARRAY2_HEAD: u8 = 0x82;

/// CBOR head for an unsigned integer with a one-octet argument.
const UINT8_HEAD: u8 = 0x18;

/// CBOR null.
const NULL: u8 = 0xF6;

/// Inner payload map: non-negative integer keys to CBOR values.
///
/// Values are held as [`ciborium::value::Value`]; the typed accessors
/// are the public API and hide which concrete integer width the parser
/// chose. They perform lossless numeric coercion only: an unsigned
/// value that fits may be read as signed, a non-negative signed value
/// may be read as unsigned, and doubles may be read as integers by
/// truncation. Any other type mismatch reads as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InnerMap {
    entries: BTreeMap<u64, Value>,
}

impl InnerMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `key` is present, regardless of value type.
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        self.entries.contains_key(&key)
    }

    /// Store an unsigned integer.
    pub fn insert_u64(&mut self, key: u64, value: u64) {
        self.entries.insert(key, Value::Integer(Integer::from(value)));
    }

    /// Store a signed integer.
    pub fn insert_i64(&mut self, key: u64, value: i64) {
        self.entries.insert(key, Value::Integer(Integer::from(value)));
    }

    /// Store a double.
    pub fn insert_f64(&mut self, key: u64, value: f64) {
        self.entries.insert(key, Value::Float(value));
    }

    /// Store a boolean.
    pub fn insert_bool(&mut self, key: u64, value: bool) {
        self.entries.insert(key, Value::Bool(value));
    }

    /// Store a byte string.
    pub fn insert_bytes(&mut self, key: u64, value: impl Into<Vec<u8>>) {
        self.entries.insert(key, Value::Bytes(value.into()));
    }

    /// Read `key` as an unsigned integer.
    #[must_use]
    pub fn get_u64(&self, key: u64) -> Option<u64> {
        match self.entries.get(&key)? {
            Value::Integer(value) => u64::try_from(i128::from(*value)).ok(),
            Value::Float(value) if value.is_finite() => {
                let truncated = value.trunc();
                (truncated >= 0.0 && truncated < u64::MAX as f64).then_some(truncated as u64)
            },
            _ => None,
        }
    }

    /// Read `key` as a signed integer.
    #[must_use]
    pub fn get_i64(&self, key: u64) -> Option<i64> {
        match self.entries.get(&key)? {
            Value::Integer(value) => i64::try_from(i128::from(*value)).ok(),
            Value::Float(value) if value.is_finite() => {
                let truncated = value.trunc();
                (truncated >= i64::MIN as f64 && truncated < i64::MAX as f64)
                    .then_some(truncated as i64)
            },
            _ => None,
        }
    }

    /// Read `key` as a double. No coercion from integers.
    #[must_use]
    pub fn get_f64(&self, key: u64) -> Option<f64> {
        match self.entries.get(&key)? {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Read `key` as a boolean.
    #[must_use]
    pub fn get_bool(&self, key: u64) -> Option<bool> {
        match self.entries.get(&key)? {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Read `key` as a byte string.
    #[must_use]
    pub fn get_bytes(&self, key: u64) -> Option<&[u8]> {
        match self.entries.get(&key)? {
            Value::Bytes(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Raw entries, in key order.
    ///
    /// Escape hatch: the concrete numeric type of each [`Value`] is
    /// whatever the CBOR parser chose and is not guaranteed across
    /// implementations. Prefer the typed accessors.
    pub fn raw(&self) -> impl Iterator<Item = (u64, &Value)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Build from decoded CBOR map pairs, validating key types.
    fn from_pairs(pairs: Vec<(Value, Value)>) -> Result<Self, PayloadError> {
        let mut entries = BTreeMap::new();
        for (key, value) in pairs {
            let Value::Integer(key) = key else {
                return Err(PayloadError::InvalidKey);
            };
            let key = u64::try_from(i128::from(key)).map_err(|_| PayloadError::InvalidKey)?;
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }

    /// View as a CBOR value for serialization.
    fn to_value(&self) -> Value {
        Value::Map(
            self.entries
                .iter()
                .map(|(key, value)| (Value::Integer(Integer::from(*key)), value.clone()))
                .collect(),
        )
    }
}

/// Serialize `[message_type, inner_or_null]` to wire octets.
///
/// The outer array head and the message type always occupy the first
/// three octets (`0x82 0x18 <type>`); the inner element follows as
/// null or a map.
///
/// # Errors
///
/// [`EncodeError::Cbor`] when inner map serialization fails.
pub fn encode_payload(message_type: u8, inner: Option<&InnerMap>) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(4);
    out.push(ARRAY2_HEAD);
    out.push(UINT8_HEAD);
    out.push(message_type);
    match inner {
        None => out.push(NULL),
        Some(map) => {
            ciborium::ser::into_writer(&map.to_value(), &mut out)
                .map_err(|e| EncodeError::Cbor(e.to_string()))?;
        },
    }
    Ok(out)
}

/// Parse a payload into `(message_type, inner_map_or_none)`.
///
/// # Errors
///
/// One of the [`PayloadError`] variants; each failure mode is
/// distinguished so log viewers can say what exactly the firmware got
/// wrong.
pub fn decode_payload(bytes: &[u8]) -> Result<(u8, Option<InnerMap>), PayloadError> {
    if bytes.is_empty() {
        return Err(PayloadError::Empty);
    }

    let value: Value =
        ciborium::de::from_reader(bytes).map_err(|e| PayloadError::Cbor(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(PayloadError::OuterShape);
    };
    let [first, second]: [Value; 2] =
        items.try_into().map_err(|_| PayloadError::OuterShape)?;

    let Value::Integer(message_type) = first else {
        return Err(PayloadError::TypeOutOfRange);
    };
    let message_type =
        u8::try_from(i128::from(message_type)).map_err(|_| PayloadError::TypeOutOfRange)?;

    let inner = match second {
        Value::Null => None,
        Value::Map(pairs) => Some(InnerMap::from_pairs(pairs)?),
        _ => return Err(PayloadError::InnerShape),
    };

    Ok((message_type, inner))
}
