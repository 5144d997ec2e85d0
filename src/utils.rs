use std::string::FromUtf16Error;
use thiserror::Error;

/// `ERROR_INVALID_DATA`, reported by SetupAPI when a device has no value for a property.
pub const ERROR_INVALID_DATA: u32 = 13;
/// `ERROR_INSUFFICIENT_BUFFER`
pub const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
/// `ERROR_NO_MORE_ITEMS`
pub const ERROR_NO_MORE_ITEMS: u32 = 259;

/// Errors raised while enumerating, querying or removing devices.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device has no value for the requested property, or the value is not valid.
    #[error("device property is not present or is not valid")]
    PropertyAbsent,
    #[error("expected {expected} registry type but received type {actual}")]
    UnexpectedRegistryType { expected: &'static str, actual: u32 },
    #[error("expected 4-byte DWORD but received {0} bytes")]
    InvalidDwordLength(usize),
    #[error("SetupAPI call failed with Win32 error {code}")]
    Win32 { code: u32 },
    #[error("SetupAPI returned an invalid handle")]
    InvalidHandle,
    #[error("string {0:?} contains an interior nul")]
    InteriorNul(String),
    #[error("failed to decode UTF-16 data: {0}")]
    Utf16Decode(#[from] FromUtf16Error),
    #[cfg(windows)]
    #[error("setupapi.dll could not be loaded: {0}")]
    LibraryLoad(#[from] libloading::Error),
}

impl DeviceError {
    /// Map a Win32 error code to an error, keeping "no data for this property" distinguishable.
    pub fn from_win32(code: u32) -> Self {
        match code {
            ERROR_INVALID_DATA => DeviceError::PropertyAbsent,
            code => DeviceError::Win32 { code },
        }
    }

    /// Reports whether the error means the property simply has no value.
    pub fn is_absent(&self) -> bool {
        matches!(self, DeviceError::PropertyAbsent)
    }

    /// Reports whether the platform returned data in an unexpected encoding.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            DeviceError::UnexpectedRegistryType { .. } | DeviceError::InvalidDwordLength(_)
        )
    }

    /// The Win32 error code behind this error, if there is one.
    pub fn win32_code(&self) -> Option<u32> {
        match self {
            DeviceError::PropertyAbsent => Some(ERROR_INVALID_DATA),
            DeviceError::Win32 { code } => Some(*code),
            _ => None,
        }
    }
}

pub type DeviceResult<T> = Result<T, DeviceError>;
