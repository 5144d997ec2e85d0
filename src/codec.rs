//! Decoding of raw registry-typed property data.
//!
//! SetupAPI returns every device registry property as a byte buffer plus a
//! registry type tag. Strings are UTF-16LE; DWORDs are 4 bytes in the endianness
//! named by the tag.

use crate::property::{PropertyShape, PropertyValue, RegistryType};
use crate::{DeviceError, DeviceResult};
use widestring::U16Str;

/// Reinterpret little-endian bytes as UTF-16 code units. A trailing odd byte is ignored.
pub fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Convert UTF-16 code units to a string, stopping at the first nul.
pub fn utf16_to_string(units: &[u16]) -> DeviceResult<String> {
    let end = units.iter().position(|&c| c == 0).unwrap_or(units.len());
    let value = U16Str::from_slice(&units[..end]).to_string()?;
    Ok(value)
}

/// Split a `REG_MULTI_SZ` style sequence. The list ends at the first empty string.
pub fn utf16_to_strings(units: &[u16]) -> DeviceResult<Vec<String>> {
    units
        .split(|&c| c == 0)
        .take_while(|segment| !segment.is_empty())
        .map(|segment| -> DeviceResult<String> { Ok(U16Str::from_slice(segment).to_string()?) })
        .collect()
}

pub fn decode_string(reg_type: u32, data: &[u8]) -> DeviceResult<String> {
    match RegistryType::from(reg_type) {
        RegistryType::Sz | RegistryType::ExpandSz => utf16_to_string(&utf16_units(data)),
        _ => Err(DeviceError::UnexpectedRegistryType {
            expected: "REG_SZ",
            actual: reg_type,
        }),
    }
}

/// Decode a string list. A single string is accepted as a list of one.
pub fn decode_string_list(reg_type: u32, data: &[u8]) -> DeviceResult<Vec<String>> {
    match RegistryType::from(reg_type) {
        RegistryType::Sz | RegistryType::ExpandSz => {
            Ok(vec![utf16_to_string(&utf16_units(data))?])
        }
        RegistryType::MultiSz => utf16_to_strings(&utf16_units(data)),
        _ => Err(DeviceError::UnexpectedRegistryType {
            expected: "REG_MULTI_SZ",
            actual: reg_type,
        }),
    }
}

pub fn decode_u32(reg_type: u32, data: &[u8]) -> DeviceResult<u32> {
    let bytes: [u8; 4] = match data {
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return Err(DeviceError::InvalidDwordLength(data.len())),
    };

    match RegistryType::from(reg_type) {
        RegistryType::DwordLittleEndian => Ok(u32::from_le_bytes(bytes)),
        RegistryType::DwordBigEndian => Ok(u32::from_be_bytes(bytes)),
        _ => Err(DeviceError::UnexpectedRegistryType {
            expected: "REG_DWORD",
            actual: reg_type,
        }),
    }
}

pub fn decode(shape: PropertyShape, reg_type: u32, data: &[u8]) -> DeviceResult<PropertyValue> {
    match shape {
        PropertyShape::String => decode_string(reg_type, data).map(PropertyValue::String),
        PropertyShape::StringList => {
            decode_string_list(reg_type, data).map(PropertyValue::StringList)
        }
        PropertyShape::Uint32 => decode_u32(reg_type, data).map(PropertyValue::Uint32),
    }
}

/// Encode a string the way SetupAPI reports `REG_SZ` data.
pub fn encode_string(value: &str) -> Vec<u8> {
    value
        .encode_utf16()
        .chain(Some(0))
        .flat_map(|c| c.to_le_bytes().to_vec())
        .collect()
}

/// Encode a list the way SetupAPI reports `REG_MULTI_SZ` data, double-nul terminated.
pub fn encode_string_list<S: AsRef<str>>(values: &[S]) -> Vec<u8> {
    let mut data: Vec<u8> = values
        .iter()
        .flat_map(|value| encode_string(value.as_ref()))
        .collect();
    data.extend_from_slice(&[0, 0]);
    data
}
