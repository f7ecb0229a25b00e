//! Native-protocol binary codec for values
//!
//! Serialization formats follow the native protocol v3+: fixed-width
//! big-endian scalars, UTF-8 text, 16-byte UUIDs, 4/16-byte inet
//! addresses; collections are `[count:i32]` followed by
//! `[len:i32][bytes]` per element; tuples and UDTs are consecutive
//! `[len:i32][bytes]` fields where a length of -1 marks a null field.
//! The formats are identical across v3..v5, so the protocol version
//! only gates whether encoding is allowed at all.
//!
//! Values are expected to have passed [`ColumnType::validate`] first;
//! the codec rejects rather than coerces.

use crate::column::ColumnType;
use crate::protocol::ProtocolVersion;
use crate::value::Value;
use std::net::IpAddr;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while encoding or decoding values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The protocol version does not support value serialization.
    #[error("unsupported protocol version for value serialization: {0}")]
    UnsupportedVersion(ProtocolVersion),
    /// The value cannot be encoded as the target type.
    #[error("cannot encode value: {0}")]
    Encode(String),
    /// The bytes cannot be decoded as the target type.
    #[error("cannot decode value: {0}")]
    Decode(String),
}

/// Bias applied to the `date` type: day 0 sits at the middle of the
/// unsigned 32-bit range so dates before the epoch are representable.
const DATE_EPOCH_BIAS: i64 = 1 << 31;

impl ColumnType {
    /// Encode a validated value under the given protocol version.
    pub fn encode(&self, value: &Value, version: ProtocolVersion) -> Result<Vec<u8>, CodecError> {
        if !version.supports_execution() {
            return Err(CodecError::UnsupportedVersion(version));
        }
        self.encode_inner(value)
    }

    fn encode_inner(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        match (self, value) {
            (ColumnType::Boolean, Value::Boolean(b)) => Ok(vec![u8::from(*b)]),
            (ColumnType::Tinyint, Value::TinyInt(v)) => Ok(v.to_be_bytes().to_vec()),
            (ColumnType::Smallint, Value::SmallInt(v)) => Ok(v.to_be_bytes().to_vec()),
            (ColumnType::Int, Value::Int(v)) => Ok(v.to_be_bytes().to_vec()),
            (ColumnType::Bigint | ColumnType::Counter, Value::BigInt(v)) => {
                Ok(v.to_be_bytes().to_vec())
            }
            (ColumnType::Counter, Value::Blob(b)) => Ok(b.clone()),
            (ColumnType::Float, Value::Float(v)) => Ok(v.to_be_bytes().to_vec()),
            (ColumnType::Double, Value::Double(v)) => Ok(v.to_be_bytes().to_vec()),
            (ColumnType::Ascii | ColumnType::Text, Value::Text(s)) => Ok(s.as_bytes().to_vec()),
            (
                ColumnType::Blob | ColumnType::Decimal | ColumnType::Varint | ColumnType::Duration,
                Value::Blob(b),
            ) => Ok(b.clone()),
            (ColumnType::Uuid | ColumnType::Timeuuid, Value::Uuid(u)) => {
                Ok(u.as_bytes().to_vec())
            }
            (ColumnType::Inet, Value::Inet(addr)) => Ok(match addr {
                IpAddr::V4(v4) => v4.octets().to_vec(),
                IpAddr::V6(v6) => v6.octets().to_vec(),
            }),
            (ColumnType::Timestamp | ColumnType::Time, Value::Timestamp(v)) => {
                Ok(v.to_be_bytes().to_vec())
            }
            (ColumnType::Date, Value::Int(days)) => {
                let unsigned = (i64::from(*days) + DATE_EPOCH_BIAS) as u32;
                Ok(unsigned.to_be_bytes().to_vec())
            }
            (ColumnType::List { element, .. }, Value::List(items))
            | (ColumnType::Set { element, .. }, Value::Set(items)) => {
                let mut out = Vec::new();
                write_i32(&mut out, to_i32_count(items.len())?);
                for item in items {
                    if item.is_null() {
                        return Err(CodecError::Encode(
                            "null is not allowed inside collections".to_string(),
                        ));
                    }
                    write_segment(&mut out, Some(&element.encode_inner(item)?));
                }
                Ok(out)
            }
            (ColumnType::Map { key, value: vt, .. }, Value::Map(entries)) => {
                let mut out = Vec::new();
                write_i32(&mut out, to_i32_count(entries.len())?);
                for (k, v) in entries {
                    if k.is_null() || v.is_null() {
                        return Err(CodecError::Encode(
                            "null is not allowed inside collections".to_string(),
                        ));
                    }
                    write_segment(&mut out, Some(&key.encode_inner(k)?));
                    write_segment(&mut out, Some(&vt.encode_inner(v)?));
                }
                Ok(out)
            }
            (ColumnType::Tuple { elements, .. }, Value::Tuple(items)) => {
                let mut out = Vec::new();
                for (item, element_type) in items.iter().zip(elements.iter()) {
                    if item.is_null() {
                        write_segment(&mut out, None);
                    } else {
                        write_segment(&mut out, Some(&element_type.encode_inner(item)?));
                    }
                }
                Ok(out)
            }
            (ColumnType::UserDefined { fields, .. }, Value::Udt(provided)) => {
                let mut out = Vec::new();
                for (field_name, field_type) in fields {
                    let field_value = provided
                        .iter()
                        .find(|(n, _)| n == field_name)
                        .map(|(_, v)| v);
                    match field_value {
                        Some(v) if !v.is_null() => {
                            write_segment(&mut out, Some(&field_type.encode_inner(v)?))
                        }
                        _ => write_segment(&mut out, None),
                    }
                }
                Ok(out)
            }
            (t, v) => Err(CodecError::Encode(format!(
                "value of type '{}' does not fit CQL type '{}'",
                v.type_name(),
                t.cql_name()
            ))),
        }
    }

    /// Decode bytes produced by [`ColumnType::encode`] for this type.
    pub fn decode(&self, bytes: &[u8], version: ProtocolVersion) -> Result<Value, CodecError> {
        if !version.supports_execution() {
            return Err(CodecError::UnsupportedVersion(version));
        }
        self.decode_inner(bytes)
    }

    fn decode_inner(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        match self {
            ColumnType::Boolean => match bytes {
                [0] => Ok(Value::Boolean(false)),
                [_] => Ok(Value::Boolean(true)),
                _ => Err(decode_len_error("boolean", 1, bytes.len())),
            },
            ColumnType::Tinyint => Ok(Value::TinyInt(i8::from_be_bytes(fixed(bytes, "tinyint")?))),
            ColumnType::Smallint => Ok(Value::SmallInt(i16::from_be_bytes(fixed(
                bytes, "smallint",
            )?))),
            ColumnType::Int => Ok(Value::Int(i32::from_be_bytes(fixed(bytes, "int")?))),
            ColumnType::Bigint | ColumnType::Counter => {
                Ok(Value::BigInt(i64::from_be_bytes(fixed(bytes, "bigint")?)))
            }
            ColumnType::Float => Ok(Value::Float(f32::from_be_bytes(fixed(bytes, "float")?))),
            ColumnType::Double => Ok(Value::Double(f64::from_be_bytes(fixed(bytes, "double")?))),
            ColumnType::Ascii | ColumnType::Text => String::from_utf8(bytes.to_vec())
                .map(Value::Text)
                .map_err(|_| CodecError::Decode("text value is not valid UTF-8".to_string())),
            ColumnType::Blob | ColumnType::Decimal | ColumnType::Varint | ColumnType::Duration => {
                Ok(Value::Blob(bytes.to_vec()))
            }
            ColumnType::Uuid | ColumnType::Timeuuid => {
                let raw: [u8; 16] = fixed(bytes, "uuid")?;
                Ok(Value::Uuid(Uuid::from_bytes(raw)))
            }
            ColumnType::Inet => match bytes.len() {
                4 => {
                    let raw: [u8; 4] = fixed(bytes, "inet")?;
                    Ok(Value::Inet(IpAddr::from(raw)))
                }
                16 => {
                    let raw: [u8; 16] = fixed(bytes, "inet")?;
                    Ok(Value::Inet(IpAddr::from(raw)))
                }
                n => Err(CodecError::Decode(format!(
                    "inet value must be 4 or 16 bytes, got {}",
                    n
                ))),
            },
            ColumnType::Timestamp | ColumnType::Time => Ok(Value::Timestamp(i64::from_be_bytes(
                fixed(bytes, "timestamp")?,
            ))),
            ColumnType::Date => {
                let raw: [u8; 4] = fixed(bytes, "date")?;
                let days = i64::from(u32::from_be_bytes(raw)) - DATE_EPOCH_BIAS;
                Ok(Value::Int(days as i32))
            }
            ColumnType::List { element, .. } => {
                Ok(Value::List(decode_elements(bytes, element)?))
            }
            ColumnType::Set { element, .. } => Ok(Value::Set(decode_elements(bytes, element)?)),
            ColumnType::Map { key, value, .. } => {
                let mut pos = 0usize;
                let count = read_i32(bytes, &mut pos)?;
                let count = usize::try_from(count)
                    .map_err(|_| CodecError::Decode("negative map entry count".to_string()))?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let k = read_required_segment(bytes, &mut pos, "map key")?;
                    let v = read_required_segment(bytes, &mut pos, "map value")?;
                    entries.push((key.decode_inner(k)?, value.decode_inner(v)?));
                }
                Ok(Value::Map(entries))
            }
            ColumnType::Tuple { elements, .. } => {
                let mut pos = 0usize;
                let mut items = Vec::new();
                for element_type in elements {
                    if pos >= bytes.len() {
                        break; // trailing elements omitted
                    }
                    match read_segment(bytes, &mut pos)? {
                        Some(raw) => items.push(element_type.decode_inner(raw)?),
                        None => items.push(Value::Null),
                    }
                }
                Ok(Value::Tuple(items))
            }
            ColumnType::UserDefined { fields, .. } => {
                let mut pos = 0usize;
                let mut decoded = Vec::new();
                for (field_name, field_type) in fields {
                    if pos >= bytes.len() {
                        break;
                    }
                    match read_segment(bytes, &mut pos)? {
                        Some(raw) => {
                            decoded.push((field_name.clone(), field_type.decode_inner(raw)?))
                        }
                        None => decoded.push((field_name.clone(), Value::Null)),
                    }
                }
                Ok(Value::Udt(decoded))
            }
        }
    }
}

fn decode_elements(bytes: &[u8], element: &ColumnType) -> Result<Vec<Value>, CodecError> {
    let mut pos = 0usize;
    let count = read_i32(bytes, &mut pos)?;
    let count = usize::try_from(count)
        .map_err(|_| CodecError::Decode("negative collection element count".to_string()))?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let raw = read_required_segment(bytes, &mut pos, "collection element")?;
        items.push(element.decode_inner(raw)?);
    }
    Ok(items)
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N], CodecError> {
    bytes
        .try_into()
        .map_err(|_| decode_len_error(what, N, bytes.len()))
}

fn decode_len_error(what: &str, expected: usize, got: usize) -> CodecError {
    CodecError::Decode(format!(
        "{} value must be {} bytes, got {}",
        what, expected, got
    ))
}

fn to_i32_count(len: usize) -> Result<i32, CodecError> {
    i32::try_from(len).map_err(|_| CodecError::Encode("collection too large".to_string()))
}

fn write_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn write_segment(out: &mut Vec<u8>, bytes: Option<&[u8]>) {
    match bytes {
        Some(b) => {
            // Encoded segments are bounded by to_i32_count upstream.
            out.extend_from_slice(&(b.len() as i32).to_be_bytes());
            out.extend_from_slice(b);
        }
        None => out.extend_from_slice(&(-1i32).to_be_bytes()),
    }
}

fn read_i32(bytes: &[u8], pos: &mut usize) -> Result<i32, CodecError> {
    let end = pos
        .checked_add(4)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| CodecError::Decode("truncated length prefix".to_string()))?;
    let raw: [u8; 4] = bytes[*pos..end]
        .try_into()
        .map_err(|_| CodecError::Decode("truncated length prefix".to_string()))?;
    *pos = end;
    Ok(i32::from_be_bytes(raw))
}

fn read_segment<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<Option<&'a [u8]>, CodecError> {
    let len = read_i32(bytes, pos)?;
    if len < 0 {
        return Ok(None);
    }
    let len = len as usize;
    let end = pos
        .checked_add(len)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| CodecError::Decode("truncated value segment".to_string()))?;
    let segment = &bytes[*pos..end];
    *pos = end;
    Ok(Some(segment))
}

fn read_required_segment<'a>(
    bytes: &'a [u8],
    pos: &mut usize,
    what: &str,
) -> Result<&'a [u8], CodecError> {
    read_segment(bytes, pos)?
        .ok_or_else(|| CodecError::Decode(format!("unexpected null {}", what)))
}
