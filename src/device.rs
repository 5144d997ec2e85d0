use crate::api::{DeviceApi, DeviceListHandle, DeviceRecord};
use crate::codec;
use crate::driver::{DriverQuery, DriverSet};
use crate::property::{InstallState, PropertyId, PropertyShape, PropertyValue};
use crate::removal::{self, RemovalOutcome, RemovalRequest, RemovalScope};
use crate::retrieve::retrieve;
use crate::DeviceResult;
use std::fmt;

/// Size of the stack buffer used for the first attempt at reading a string property.
const PROPERTY_BUFFER_SIZE: usize = 1024 * 2;

/// Provides access to one device while a query is being executed.
///
/// `Device` is a copyable view over a record in an open device list. It borrows
/// the enumeration that produced it and cannot be kept after the query callback
/// returns.
///
/// `Device` is neither `Send` nor `Sync`. Backends such as the in-memory test
/// fixtures keep unsynchronized state, so reads happen on the thread running the
/// query. To read devices in parallel, run one query per thread.
#[derive(Clone, Copy)]
pub struct Device<'a> {
    api: &'a dyn DeviceApi,
    list: DeviceListHandle,
    record: DeviceRecord,
}

impl<'a> Device<'a> {
    pub(crate) fn new(api: &'a dyn DeviceApi, list: DeviceListHandle, record: DeviceRecord) -> Self {
        Self { api, list, record }
    }

    /// Low-level access to the device list handle and the record.
    pub fn sys(&self) -> (DeviceListHandle, DeviceRecord) {
        (self.list, self.record)
    }

    pub(crate) fn api(&self) -> &'a dyn DeviceApi {
        self.api
    }

    /// Read a property as a single string.
    pub fn string_property(&self, property: PropertyId) -> DeviceResult<String> {
        let mut buffer = [0u8; PROPERTY_BUFFER_SIZE];
        retrieve(
            &mut buffer,
            |buffer| {
                self.api
                    .registry_property(self.list, &self.record, property, buffer)
            },
            codec::decode_string,
        )
    }

    /// Read a property as a list of strings.
    pub fn string_list_property(&self, property: PropertyId) -> DeviceResult<Vec<String>> {
        let mut buffer = [0u8; PROPERTY_BUFFER_SIZE];
        retrieve(
            &mut buffer,
            |buffer| {
                self.api
                    .registry_property(self.list, &self.record, property, buffer)
            },
            codec::decode_string_list,
        )
    }

    /// Read a property as a DWORD.
    pub fn u32_property(&self, property: PropertyId) -> DeviceResult<u32> {
        let mut buffer = [0u8; 4];
        retrieve(
            &mut buffer,
            |buffer| {
                self.api
                    .registry_property(self.list, &self.record, property, buffer)
            },
            codec::decode_u32,
        )
    }

    /// Read a property, decoded according to its expected shape.
    pub fn property(&self, property: PropertyId) -> DeviceResult<PropertyValue> {
        match property.shape() {
            PropertyShape::String => self.string_property(property).map(PropertyValue::String),
            PropertyShape::StringList => self
                .string_list_property(property)
                .map(PropertyValue::StringList),
            PropertyShape::Uint32 => self.u32_property(property).map(PropertyValue::Uint32),
        }
    }

    /// The device instance ID, e.g. `PCI\VEN_8086&DEV_15B8&SUBSYS_86721043&REV_00\3&11583659&0&FE`.
    pub fn instance_id(&self) -> DeviceResult<String> {
        self.api.instance_id(self.list, &self.record)
    }

    pub fn description(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::Description)
    }

    pub fn friendly_name(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::FriendlyName)
    }

    /// The setup class name of the device.
    pub fn class(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::Class)
    }

    /// The string form of the device's setup class GUID.
    pub fn class_guid(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::ClassGuid)
    }

    pub fn hardware_id(&self) -> DeviceResult<Vec<String>> {
        self.string_list_property(PropertyId::HardwareId)
    }

    pub fn compatible_id(&self) -> DeviceResult<Vec<String>> {
        self.string_list_property(PropertyId::CompatibleId)
    }

    pub fn manufacturer(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::Manufacturer)
    }

    pub fn location_information(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::LocationInformation)
    }

    pub fn physical_device_object_name(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::PhysicalDeviceObjectName)
    }

    pub fn enumerator_name(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::EnumeratorName)
    }

    pub fn service(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::Service)
    }

    /// The registry name of the device's driver key.
    pub fn driver(&self) -> DeviceResult<String> {
        self.string_property(PropertyId::Driver)
    }

    pub fn driver_reg_name(&self) -> DeviceResult<String> {
        self.driver()
    }

    pub fn config_flags(&self) -> DeviceResult<u32> {
        self.u32_property(PropertyId::ConfigFlags)
    }

    pub fn dev_type(&self) -> DeviceResult<u32> {
        self.u32_property(PropertyId::DevType)
    }

    pub fn characteristics(&self) -> DeviceResult<u32> {
        self.u32_property(PropertyId::Characteristics)
    }

    pub fn install_state(&self) -> DeviceResult<InstallState> {
        self.u32_property(PropertyId::InstallState)
            .map(InstallState::from)
    }

    /// The drivers affiliated with the device.
    pub fn drivers(&self, query: DriverQuery) -> DriverSet<'a> {
        DriverSet::new(*self, query)
    }

    /// The driver currently installed for the device.
    pub fn installed_driver(&self) -> DriverSet<'a> {
        self.drivers(DriverQuery::installed())
    }

    /// Remove the device.
    ///
    /// With [`RemovalScope::Global`] every hardware profile is affected; with
    /// [`RemovalScope::ConfigSpecific`] only `hardware_profile` is. A hardware
    /// profile of zero means the current one.
    pub fn remove(&self, scope: RemovalScope, hardware_profile: u32) -> DeviceResult<RemovalOutcome> {
        removal::remove(
            *self,
            RemovalRequest {
                scope,
                hardware_profile,
            },
        )
    }
}

impl fmt::Debug for Device<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("list", &self.list)
            .field("record", &self.record)
            .finish()
    }
}
