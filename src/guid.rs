use serde::{ser, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A globally unique identifier, laid out like the Win32 `GUID` structure.
///
/// Formats as `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`, which is also how SetupAPI
/// reports class GUIDs as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0:?} is not a valid GUID")]
pub struct ParseGuidError(pub String);

impl Guid {
    pub const fn from_u128(value: u128) -> Self {
        Self {
            data1: (value >> 96) as u32,
            data2: (value >> 80 & 0xffff) as u16,
            data3: (value >> 64 & 0xffff) as u16,
            data4: (value as u64).to_be_bytes(),
        }
    }

    pub fn as_u128(&self) -> u128 {
        (self.data1 as u128) << 96
            | (self.data2 as u128) << 80
            | (self.data3 as u128) << 64
            | u64::from_be_bytes(self.data4) as u128
    }

    pub fn is_nil(&self) -> bool {
        self.as_u128() == 0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl FromStr for Guid {
    type Err = ParseGuidError;

    /// Accepts the braced and the bare hyphenated forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGuidError(s.to_owned());

        let inner = match (s.starts_with('{'), s.ends_with('}')) {
            (true, true) if s.len() >= 2 => &s[1..s.len() - 1],
            (false, false) => s,
            _ => return Err(err()),
        };

        let groups: Vec<&str> = inner.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if groups.len() != lengths.len()
            || groups
                .iter()
                .zip(lengths.iter())
                .any(|(group, len)| group.len() != *len || !group.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(err());
        }

        let hex: String = groups.concat();
        let value = u128::from_str_radix(&hex, 16).map_err(|_| err())?;

        Ok(Self::from_u128(value))
    }
}

impl Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // GUID_DEVCLASS_NET
    const NET: Guid = Guid::from_u128(0x4d36e972_e325_11ce_bfc1_08002be10318);

    #[test]
    fn it_formats_like_setupapi() {
        assert_eq!(NET.to_string(), "{4D36E972-E325-11CE-BFC1-08002BE10318}");
        assert_eq!(NET.data1, 0x4d36e972);
        assert_eq!(NET.data2, 0xe325);
        assert_eq!(NET.data3, 0x11ce);
        assert_eq!(NET.data4, [0xbf, 0xc1, 0x08, 0x00, 0x2b, 0xe1, 0x03, 0x18]);
    }

    #[test]
    fn it_parses_braced_and_bare_forms() {
        let braced: Guid = "{4d36e972-e325-11ce-bfc1-08002be10318}".parse().unwrap();
        let bare: Guid = "4D36E972-E325-11CE-BFC1-08002BE10318".parse().unwrap();

        assert_eq!(braced, NET);
        assert_eq!(bare, NET);
        assert_eq!(NET.as_u128(), 0x4d36e972_e325_11ce_bfc1_08002be10318);
    }

    #[test]
    fn it_rejects_malformed_strings() {
        assert!("{4d36e972-e325-11ce-bfc1-08002be10318".parse::<Guid>().is_err());
        assert!("4d36e972e32511cebfc108002be10318".parse::<Guid>().is_err());
        assert!("{4d36e972-e325-11ce-bfc1-08002be1031z}".parse::<Guid>().is_err());
        assert!("".parse::<Guid>().is_err());
    }

    #[test]
    fn it_serializes_as_a_string() {
        let v = serde_json::to_string(&NET).unwrap();

        assert_eq!(v, "\"{4D36E972-E325-11CE-BFC1-08002BE10318}\"");
        assert!(Guid::default().is_nil());
    }
}
