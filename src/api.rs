//! The primitive device-configuration operations the query engine is built on.
//!
//! [`DeviceApi`] is implemented by [`SetupApi`](crate::setupapi::SetupApi) on Windows.
//! Anything else implementing it (an in-memory double, a remote proxy) can drive
//! [`Query`](crate::Query), [`Device`](crate::Device) and
//! [`DriverSet`](crate::DriverSet) unchanged.

use crate::driver::{Driver, DriverType};
use crate::flags::{ClassDevsFlags, DiFunction, InstallParams};
use crate::property::PropertyId;
use crate::removal::ClassInstallParams;
use crate::{DeviceError, DeviceResult, Guid};

/// `ERROR_NOT_SUPPORTED`
const ERROR_NOT_SUPPORTED: u32 = 50;

/// An opaque reference to a platform-managed device list (`HDEVINFO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceListHandle(pub isize);

/// Identifies one member of a device list. Mirrors `SP_DEVINFO_DATA`.
///
/// A record carries no device data of its own and is only meaningful while the
/// list it came from is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceRecord {
    pub class_guid: Guid,
    pub dev_inst: u32,
    pub reserved: usize,
}

/// The result of a call that fills a caller-provided buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStatus<M> {
    /// The first `len` elements of the buffer hold the data.
    Filled { len: usize, meta: M },
    /// The buffer must hold at least `required` elements.
    TooSmall { required: usize },
}

pub trait DeviceApi {
    /// Open a list of devices. `None` arguments are passed to the platform as null.
    fn open_device_list(
        &self,
        class: Option<&Guid>,
        enumerator: Option<&str>,
        flags: ClassDevsFlags,
        machine: Option<&str>,
    ) -> DeviceResult<DeviceListHandle>;

    /// Fetch the record at `index`. `Ok(None)` marks the end of the list.
    fn enumerate_device(
        &self,
        list: DeviceListHandle,
        index: u32,
    ) -> DeviceResult<Option<DeviceRecord>>;

    fn close_device_list(&self, list: DeviceListHandle) -> DeviceResult<()>;

    /// Copy raw property data into `buffer`. On success `meta` is the registry type tag.
    fn registry_property(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        property: PropertyId,
        buffer: &mut [u8],
    ) -> DeviceResult<BufferStatus<u32>>;

    fn instance_id(&self, list: DeviceListHandle, record: &DeviceRecord) -> DeviceResult<String>;

    fn set_class_install_params(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        params: &ClassInstallParams,
    ) -> DeviceResult<()>;

    fn call_class_installer(
        &self,
        function: DiFunction,
        list: DeviceListHandle,
        record: &DeviceRecord,
    ) -> DeviceResult<()>;

    fn install_params(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
    ) -> DeviceResult<InstallParams>;

    fn set_install_params(
        &self,
        _list: DeviceListHandle,
        _record: &DeviceRecord,
        _params: InstallParams,
    ) -> DeviceResult<()> {
        Err(DeviceError::Win32 {
            code: ERROR_NOT_SUPPORTED,
        })
    }

    fn build_driver_list(
        &self,
        _list: DeviceListHandle,
        _record: &DeviceRecord,
        _driver_type: DriverType,
    ) -> DeviceResult<()> {
        Err(DeviceError::Win32 {
            code: ERROR_NOT_SUPPORTED,
        })
    }

    /// Fetch the driver at `index`. `Ok(None)` marks the end of the list.
    fn enumerate_driver(
        &self,
        _list: DeviceListHandle,
        _record: &DeviceRecord,
        _driver_type: DriverType,
        _index: u32,
    ) -> DeviceResult<Option<Driver>> {
        Err(DeviceError::Win32 {
            code: ERROR_NOT_SUPPORTED,
        })
    }

    fn destroy_driver_list(
        &self,
        _list: DeviceListHandle,
        _record: &DeviceRecord,
        _driver_type: DriverType,
    ) -> DeviceResult<()> {
        Err(DeviceError::Win32 {
            code: ERROR_NOT_SUPPORTED,
        })
    }

    /// Copy the GUIDs of every setup class named `name` into `buffer`.
    fn class_guids_from_name(
        &self,
        _name: &str,
        _machine: Option<&str>,
        _buffer: &mut [Guid],
    ) -> DeviceResult<BufferStatus<()>> {
        Err(DeviceError::Win32 {
            code: ERROR_NOT_SUPPORTED,
        })
    }
}
