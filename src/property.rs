//! Device registry property identifiers and their decoded values.
//!
//! The numeric codes are the `SPDRP_*` values accepted by
//! [SetupDiGetDeviceRegistryProperty](https://learn.microsoft.com/en-us/windows/win32/api/setupapi/nf-setupapi-setupdigetdeviceregistrypropertyw).

use serde::Serialize;
use std::fmt;

/// The decoded shape a property is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    String,
    StringList,
    Uint32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Description,
    HardwareId,
    CompatibleId,
    Service,
    Class,
    ClassGuid,
    Driver,
    ConfigFlags,
    Manufacturer,
    FriendlyName,
    LocationInformation,
    PhysicalDeviceObjectName,
    Capabilities,
    UiNumber,
    UpperFilters,
    LowerFilters,
    BusNumber,
    EnumeratorName,
    DevType,
    Characteristics,
    Address,
    RemovalPolicy,
    InstallState,
    LocationPaths,
    BaseContainerId,
}

impl PropertyId {
    pub const ALL: [PropertyId; 25] = [
        PropertyId::Description,
        PropertyId::HardwareId,
        PropertyId::CompatibleId,
        PropertyId::Service,
        PropertyId::Class,
        PropertyId::ClassGuid,
        PropertyId::Driver,
        PropertyId::ConfigFlags,
        PropertyId::Manufacturer,
        PropertyId::FriendlyName,
        PropertyId::LocationInformation,
        PropertyId::PhysicalDeviceObjectName,
        PropertyId::Capabilities,
        PropertyId::UiNumber,
        PropertyId::UpperFilters,
        PropertyId::LowerFilters,
        PropertyId::BusNumber,
        PropertyId::EnumeratorName,
        PropertyId::DevType,
        PropertyId::Characteristics,
        PropertyId::Address,
        PropertyId::RemovalPolicy,
        PropertyId::InstallState,
        PropertyId::LocationPaths,
        PropertyId::BaseContainerId,
    ];

    /// The `SPDRP_*` code for this property.
    pub const fn code(self) -> u32 {
        match self {
            PropertyId::Description => 0x00,
            PropertyId::HardwareId => 0x01,
            PropertyId::CompatibleId => 0x02,
            PropertyId::Service => 0x04,
            PropertyId::Class => 0x07,
            PropertyId::ClassGuid => 0x08,
            PropertyId::Driver => 0x09,
            PropertyId::ConfigFlags => 0x0A,
            PropertyId::Manufacturer => 0x0B,
            PropertyId::FriendlyName => 0x0C,
            PropertyId::LocationInformation => 0x0D,
            PropertyId::PhysicalDeviceObjectName => 0x0E,
            PropertyId::Capabilities => 0x0F,
            PropertyId::UiNumber => 0x10,
            PropertyId::UpperFilters => 0x11,
            PropertyId::LowerFilters => 0x12,
            PropertyId::BusNumber => 0x15,
            PropertyId::EnumeratorName => 0x16,
            PropertyId::DevType => 0x19,
            PropertyId::Characteristics => 0x1B,
            PropertyId::Address => 0x1C,
            PropertyId::RemovalPolicy => 0x1F,
            PropertyId::InstallState => 0x22,
            PropertyId::LocationPaths => 0x23,
            PropertyId::BaseContainerId => 0x24,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.code() == code)
    }

    pub const fn shape(self) -> PropertyShape {
        match self {
            PropertyId::HardwareId
            | PropertyId::CompatibleId
            | PropertyId::UpperFilters
            | PropertyId::LowerFilters
            | PropertyId::LocationPaths => PropertyShape::StringList,
            PropertyId::ConfigFlags
            | PropertyId::Capabilities
            | PropertyId::UiNumber
            | PropertyId::BusNumber
            | PropertyId::DevType
            | PropertyId::Characteristics
            | PropertyId::Address
            | PropertyId::RemovalPolicy
            | PropertyId::InstallState => PropertyShape::Uint32,
            _ => PropertyShape::String,
        }
    }

    /// A human readable label, as shown by `devlist --detail`.
    pub const fn label(self) -> &'static str {
        match self {
            PropertyId::Description => "Description",
            PropertyId::HardwareId => "Hardware ID",
            PropertyId::CompatibleId => "Compatible ID",
            PropertyId::Service => "Service",
            PropertyId::Class => "Class",
            PropertyId::ClassGuid => "Class GUID",
            PropertyId::Driver => "Driver",
            PropertyId::ConfigFlags => "Config Flags",
            PropertyId::Manufacturer => "Manufacturer",
            PropertyId::FriendlyName => "Friendly Name",
            PropertyId::LocationInformation => "Location",
            PropertyId::PhysicalDeviceObjectName => "Physical Device Object",
            PropertyId::Capabilities => "Capabilities",
            PropertyId::UiNumber => "UI Number",
            PropertyId::UpperFilters => "Upper Filters",
            PropertyId::LowerFilters => "Lower Filters",
            PropertyId::BusNumber => "Bus Number",
            PropertyId::EnumeratorName => "Enumerator",
            PropertyId::DevType => "Device Type",
            PropertyId::Characteristics => "Characteristics",
            PropertyId::Address => "Address",
            PropertyId::RemovalPolicy => "Removal Policy",
            PropertyId::InstallState => "Install State",
            PropertyId::LocationPaths => "Location Paths",
            PropertyId::BaseContainerId => "Base Container ID",
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registry data type tags reported alongside raw property data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryType {
    None,
    Sz,
    ExpandSz,
    Binary,
    DwordLittleEndian,
    DwordBigEndian,
    Link,
    MultiSz,
    Other(u32),
}

impl RegistryType {
    pub const REG_NONE: u32 = 0;
    pub const REG_SZ: u32 = 1;
    pub const REG_EXPAND_SZ: u32 = 2;
    pub const REG_BINARY: u32 = 3;
    pub const REG_DWORD_LITTLE_ENDIAN: u32 = 4;
    pub const REG_DWORD_BIG_ENDIAN: u32 = 5;
    pub const REG_LINK: u32 = 6;
    pub const REG_MULTI_SZ: u32 = 7;

    pub fn code(self) -> u32 {
        match self {
            RegistryType::None => Self::REG_NONE,
            RegistryType::Sz => Self::REG_SZ,
            RegistryType::ExpandSz => Self::REG_EXPAND_SZ,
            RegistryType::Binary => Self::REG_BINARY,
            RegistryType::DwordLittleEndian => Self::REG_DWORD_LITTLE_ENDIAN,
            RegistryType::DwordBigEndian => Self::REG_DWORD_BIG_ENDIAN,
            RegistryType::Link => Self::REG_LINK,
            RegistryType::MultiSz => Self::REG_MULTI_SZ,
            RegistryType::Other(code) => code,
        }
    }
}

impl From<u32> for RegistryType {
    fn from(code: u32) -> Self {
        match code {
            Self::REG_NONE => RegistryType::None,
            Self::REG_SZ => RegistryType::Sz,
            Self::REG_EXPAND_SZ => RegistryType::ExpandSz,
            Self::REG_BINARY => RegistryType::Binary,
            Self::REG_DWORD_LITTLE_ENDIAN => RegistryType::DwordLittleEndian,
            Self::REG_DWORD_BIG_ENDIAN => RegistryType::DwordBigEndian,
            Self::REG_LINK => RegistryType::Link,
            Self::REG_MULTI_SZ => RegistryType::MultiSz,
            other => RegistryType::Other(other),
        }
    }
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    StringList(Vec<String>),
    Uint32(u32),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::StringList(list) => f.write_str(&list.join(", ")),
            PropertyValue::Uint32(v) => write!(f, "{:#010x}", v),
        }
    }
}

/// Installation status of a device, decoded from the `InstallState` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallState {
    Installed,
    NeedsReinstall,
    FailedInstall,
    FinishInstall,
    Unknown(u32),
}

impl From<u32> for InstallState {
    fn from(value: u32) -> Self {
        match value {
            0 => InstallState::Installed,
            1 => InstallState::NeedsReinstall,
            2 => InstallState::FailedInstall,
            3 => InstallState::FinishInstall,
            other => InstallState::Unknown(other),
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InstallState::Installed => f.write_str("Installed"),
            InstallState::NeedsReinstall => f.write_str("Needs Reinstall"),
            InstallState::FailedInstall => f.write_str("Failed Install"),
            InstallState::FinishInstall => f.write_str("Finish Install"),
            InstallState::Unknown(v) => write!(f, "Unknown ({})", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_codes() {
        for id in PropertyId::ALL.iter() {
            assert_eq!(PropertyId::from_code(id.code()), Some(*id));
        }
        assert_eq!(PropertyId::from_code(0x03), None);
    }

    #[test]
    fn it_knows_the_expected_shapes() {
        assert_eq!(PropertyId::Description.shape(), PropertyShape::String);
        assert_eq!(PropertyId::HardwareId.shape(), PropertyShape::StringList);
        assert_eq!(PropertyId::InstallState.shape(), PropertyShape::Uint32);
        assert_eq!(PropertyId::ClassGuid.shape(), PropertyShape::String);
    }

    #[test]
    fn it_decodes_install_states() {
        assert_eq!(InstallState::from(0), InstallState::Installed);
        assert_eq!(InstallState::from(3), InstallState::FinishInstall);
        assert_eq!(InstallState::from(9).to_string(), "Unknown (9)");
        assert_eq!(
            serde_json::to_string(&InstallState::FailedInstall).unwrap(),
            "\"FailedInstall\""
        );
    }

    #[test]
    fn it_maps_registry_tags() {
        assert_eq!(RegistryType::from(7), RegistryType::MultiSz);
        assert_eq!(RegistryType::from(11), RegistryType::Other(11));
        assert_eq!(RegistryType::DwordBigEndian.code(), 5);
    }
}
