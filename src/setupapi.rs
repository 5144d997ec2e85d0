//! The SetupAPI backend.
//!
//! `setupapi.dll` is loaded the first time [`SetupApi::load`] is called and stays
//! loaded for the lifetime of the process.

use crate::api::{BufferStatus, DeviceApi, DeviceListHandle, DeviceRecord};
use crate::codec::utf16_to_string;
use crate::driver::{Driver, DriverType};
use crate::flags::{ClassDevsFlags, DiFlags, DiFlagsEx, DiFunction, InstallParams};
use crate::property::PropertyId;
use crate::removal::ClassInstallParams;
use crate::retrieve::retrieve;
use crate::utils::{ERROR_INSUFFICIENT_BUFFER, ERROR_NO_MORE_ITEMS};
use crate::{DeviceError, DeviceResult, Guid};
use libloading::Library;
use log::debug;
use std::mem;
use std::ptr;
use std::sync::{Mutex, OnceLock};
use widestring::U16CString;
use winapi::shared::guiddef::GUID;
use winapi::shared::minwindef::{BOOL, DWORD, PBYTE, PDWORD, UINT};
use winapi::shared::ntdef::{PCWSTR, PVOID, PWSTR};
use winapi::shared::windef::HWND;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::setupapi::{
    HDEVINFO, PSP_CLASSINSTALL_HEADER, PSP_DEVINFO_DATA, PSP_DEVINSTALL_PARAMS_W,
    SP_CLASSINSTALL_HEADER, SP_DEVINFO_DATA, SP_DEVINSTALL_PARAMS_W, SP_DRVINFO_DATA_V2_W,
    SP_REMOVEDEVICE_PARAMS,
};

/// `MAX_DEVICE_ID_LEN`
const MAX_DEVICE_ID_LEN: usize = 200;

type GetClassDevsExW =
    unsafe extern "system" fn(*const GUID, PCWSTR, HWND, DWORD, HDEVINFO, PCWSTR, PVOID) -> HDEVINFO;
type EnumDeviceInfo = unsafe extern "system" fn(HDEVINFO, DWORD, PSP_DEVINFO_DATA) -> BOOL;
type DestroyDeviceInfoList = unsafe extern "system" fn(HDEVINFO) -> BOOL;
type GetDeviceRegistryPropertyW =
    unsafe extern "system" fn(HDEVINFO, PSP_DEVINFO_DATA, DWORD, PDWORD, PBYTE, DWORD, PDWORD) -> BOOL;
type GetDeviceInstanceIdW =
    unsafe extern "system" fn(HDEVINFO, PSP_DEVINFO_DATA, PWSTR, DWORD, PDWORD) -> BOOL;
type SetClassInstallParamsW =
    unsafe extern "system" fn(HDEVINFO, PSP_DEVINFO_DATA, PSP_CLASSINSTALL_HEADER, DWORD) -> BOOL;
type CallClassInstaller = unsafe extern "system" fn(UINT, HDEVINFO, PSP_DEVINFO_DATA) -> BOOL;
type DeviceInstallParamsW =
    unsafe extern "system" fn(HDEVINFO, PSP_DEVINFO_DATA, PSP_DEVINSTALL_PARAMS_W) -> BOOL;
type DriverInfoList = unsafe extern "system" fn(HDEVINFO, PSP_DEVINFO_DATA, DWORD) -> BOOL;
type EnumDriverInfoW =
    unsafe extern "system" fn(HDEVINFO, PSP_DEVINFO_DATA, DWORD, DWORD, *mut SP_DRVINFO_DATA_V2_W) -> BOOL;
type ClassGuidsFromNameExW =
    unsafe extern "system" fn(PCWSTR, *mut GUID, DWORD, PDWORD, PCWSTR, PVOID) -> BOOL;

static SETUPAPI: OnceLock<SetupApi> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// The SetupAPI entry points used by this crate.
pub struct SetupApi {
    get_class_devs_ex: GetClassDevsExW,
    enum_device_info: EnumDeviceInfo,
    destroy_device_info_list: DestroyDeviceInfoList,
    get_device_registry_property: GetDeviceRegistryPropertyW,
    get_device_instance_id: GetDeviceInstanceIdW,
    set_class_install_params: SetClassInstallParamsW,
    call_class_installer: CallClassInstaller,
    get_device_install_params: DeviceInstallParamsW,
    set_device_install_params: DeviceInstallParamsW,
    build_driver_info_list: DriverInfoList,
    enum_driver_info: EnumDriverInfoW,
    destroy_driver_info_list: DriverInfoList,
    class_guids_from_name_ex: ClassGuidsFromNameExW,
    _library: Library,
}

impl SetupApi {
    /// Load `setupapi.dll`, or return the already loaded instance.
    pub fn load() -> DeviceResult<&'static SetupApi> {
        if let Some(api) = SETUPAPI.get() {
            return Ok(api);
        }

        let _guard = INIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(api) = SETUPAPI.get() {
            return Ok(api);
        }

        debug!("Loading setupapi.dll");
        let api = unsafe { Self::open("setupapi.dll")? };
        let _ = SETUPAPI.set(api);
        SETUPAPI.get().ok_or(DeviceError::InvalidHandle)
    }

    unsafe fn open(path: &str) -> DeviceResult<Self> {
        let library = Library::new(path)?;

        Ok(Self {
            get_class_devs_ex: symbol(&library, b"SetupDiGetClassDevsExW\0")?,
            enum_device_info: symbol(&library, b"SetupDiEnumDeviceInfo\0")?,
            destroy_device_info_list: symbol(&library, b"SetupDiDestroyDeviceInfoList\0")?,
            get_device_registry_property: symbol(&library, b"SetupDiGetDeviceRegistryPropertyW\0")?,
            get_device_instance_id: symbol(&library, b"SetupDiGetDeviceInstanceIdW\0")?,
            set_class_install_params: symbol(&library, b"SetupDiSetClassInstallParamsW\0")?,
            call_class_installer: symbol(&library, b"SetupDiCallClassInstaller\0")?,
            get_device_install_params: symbol(&library, b"SetupDiGetDeviceInstallParamsW\0")?,
            set_device_install_params: symbol(&library, b"SetupDiSetDeviceInstallParamsW\0")?,
            build_driver_info_list: symbol(&library, b"SetupDiBuildDriverInfoList\0")?,
            enum_driver_info: symbol(&library, b"SetupDiEnumDriverInfoW\0")?,
            destroy_driver_info_list: symbol(&library, b"SetupDiDestroyDriverInfoList\0")?,
            class_guids_from_name_ex: symbol(&library, b"SetupDiClassGuidsFromNameExW\0")?,
            _library: library,
        })
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &[u8]) -> DeviceResult<T> {
    Ok(*library.get::<T>(name)?)
}

fn last_error() -> DeviceError {
    DeviceError::from_win32(unsafe { GetLastError() })
}

fn check(result: BOOL) -> DeviceResult<()> {
    if result == 0 {
        return Err(last_error());
    }
    Ok(())
}

fn wide(value: Option<&str>) -> DeviceResult<Option<U16CString>> {
    value
        .map(|s| U16CString::from_str(s).map_err(|_| DeviceError::InteriorNul(s.to_string())))
        .transpose()
}

fn wide_ptr(value: &Option<U16CString>) -> PCWSTR {
    value.as_ref().map_or(ptr::null(), |s| s.as_ptr())
}

fn to_raw_guid(guid: &Guid) -> GUID {
    GUID {
        Data1: guid.data1,
        Data2: guid.data2,
        Data3: guid.data3,
        Data4: guid.data4,
    }
}

fn from_raw_guid(guid: &GUID) -> Guid {
    Guid {
        data1: guid.Data1,
        data2: guid.Data2,
        data3: guid.Data3,
        data4: guid.Data4,
    }
}

fn raw_handle(list: DeviceListHandle) -> HDEVINFO {
    list.0 as HDEVINFO
}

fn raw_record(record: &DeviceRecord) -> SP_DEVINFO_DATA {
    SP_DEVINFO_DATA {
        cbSize: mem::size_of::<SP_DEVINFO_DATA>() as DWORD,
        ClassGuid: to_raw_guid(&record.class_guid),
        DevInst: record.dev_inst,
        Reserved: record.reserved,
    }
}

/// Interpret the result of a call that fills a caller-provided buffer.
fn fill<M>(ok: BOOL, required: DWORD, meta: M) -> DeviceResult<BufferStatus<M>> {
    if ok != 0 {
        return Ok(BufferStatus::Filled {
            len: required as usize,
            meta,
        });
    }
    match unsafe { GetLastError() } {
        ERROR_INSUFFICIENT_BUFFER => Ok(BufferStatus::TooSmall {
            required: required as usize,
        }),
        code => Err(DeviceError::from_win32(code)),
    }
}

impl DeviceApi for SetupApi {
    fn open_device_list(
        &self,
        class: Option<&Guid>,
        enumerator: Option<&str>,
        flags: ClassDevsFlags,
        machine: Option<&str>,
    ) -> DeviceResult<DeviceListHandle> {
        let class = class.map(to_raw_guid);
        let enumerator = wide(enumerator)?;
        let machine = wide(machine)?;

        let handle = unsafe {
            (self.get_class_devs_ex)(
                class.as_ref().map_or(ptr::null(), |g| g as *const GUID),
                wide_ptr(&enumerator),
                ptr::null_mut(),
                flags.bits(),
                ptr::null_mut(),
                wide_ptr(&machine),
                ptr::null_mut(),
            )
        };

        if handle == INVALID_HANDLE_VALUE {
            return Err(last_error());
        }
        Ok(DeviceListHandle(handle as isize))
    }

    fn enumerate_device(
        &self,
        list: DeviceListHandle,
        index: u32,
    ) -> DeviceResult<Option<DeviceRecord>> {
        let mut data = raw_record(&DeviceRecord::default());

        if unsafe { (self.enum_device_info)(raw_handle(list), index, &mut data) } == 0 {
            return match unsafe { GetLastError() } {
                ERROR_NO_MORE_ITEMS => Ok(None),
                code => Err(DeviceError::from_win32(code)),
            };
        }

        Ok(Some(DeviceRecord {
            class_guid: from_raw_guid(&data.ClassGuid),
            dev_inst: data.DevInst,
            reserved: data.Reserved,
        }))
    }

    fn close_device_list(&self, list: DeviceListHandle) -> DeviceResult<()> {
        check(unsafe { (self.destroy_device_info_list)(raw_handle(list)) })
    }

    fn registry_property(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        property: PropertyId,
        buffer: &mut [u8],
    ) -> DeviceResult<BufferStatus<u32>> {
        let mut data = raw_record(record);
        let mut reg_type: DWORD = 0;
        let mut required: DWORD = 0;

        let ok = unsafe {
            (self.get_device_registry_property)(
                raw_handle(list),
                &mut data,
                property.code(),
                &mut reg_type,
                buffer.as_mut_ptr(),
                buffer.len() as DWORD,
                &mut required,
            )
        };
        fill(ok, required, reg_type)
    }

    fn instance_id(&self, list: DeviceListHandle, record: &DeviceRecord) -> DeviceResult<String> {
        let mut data = raw_record(record);

        retrieve(
            &mut [0u16; MAX_DEVICE_ID_LEN],
            |buffer| {
                let mut required: DWORD = 0;
                let ok = unsafe {
                    (self.get_device_instance_id)(
                        raw_handle(list),
                        &mut data,
                        buffer.as_mut_ptr(),
                        buffer.len() as DWORD,
                        &mut required,
                    )
                };
                fill(ok, required, ())
            },
            |_, units| utf16_to_string(units),
        )
    }

    fn set_class_install_params(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        params: &ClassInstallParams,
    ) -> DeviceResult<()> {
        let mut data = raw_record(record);

        match params {
            ClassInstallParams::Remove(remove) => {
                let mut raw = SP_REMOVEDEVICE_PARAMS {
                    ClassInstallHeader: SP_CLASSINSTALL_HEADER {
                        cbSize: mem::size_of::<SP_CLASSINSTALL_HEADER>() as DWORD,
                        InstallFunction: params.function().0,
                    },
                    Scope: remove.scope.code(),
                    HwProfile: remove.hardware_profile,
                };
                check(unsafe {
                    (self.set_class_install_params)(
                        raw_handle(list),
                        &mut data,
                        &mut raw.ClassInstallHeader,
                        mem::size_of::<SP_REMOVEDEVICE_PARAMS>() as DWORD,
                    )
                })
            }
        }
    }

    fn call_class_installer(
        &self,
        function: DiFunction,
        list: DeviceListHandle,
        record: &DeviceRecord,
    ) -> DeviceResult<()> {
        let mut data = raw_record(record);
        check(unsafe { (self.call_class_installer)(function.0, raw_handle(list), &mut data) })
    }

    fn install_params(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
    ) -> DeviceResult<InstallParams> {
        let mut data = raw_record(record);
        let mut raw: SP_DEVINSTALL_PARAMS_W = unsafe { mem::zeroed() };
        raw.cbSize = mem::size_of::<SP_DEVINSTALL_PARAMS_W>() as DWORD;

        check(unsafe { (self.get_device_install_params)(raw_handle(list), &mut data, &mut raw) })?;

        Ok(InstallParams {
            flags: DiFlags::from_bits_retain(raw.Flags),
            flags_ex: DiFlagsEx::from_bits_retain(raw.FlagsEx),
        })
    }

    fn set_install_params(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        params: InstallParams,
    ) -> DeviceResult<()> {
        let mut data = raw_record(record);
        let mut raw: SP_DEVINSTALL_PARAMS_W = unsafe { mem::zeroed() };
        raw.cbSize = mem::size_of::<SP_DEVINSTALL_PARAMS_W>() as DWORD;

        // Read first so the fields this crate does not model are written back unchanged.
        check(unsafe { (self.get_device_install_params)(raw_handle(list), &mut data, &mut raw) })?;
        raw.Flags = params.flags.bits();
        raw.FlagsEx = params.flags_ex.bits();
        check(unsafe { (self.set_device_install_params)(raw_handle(list), &mut data, &mut raw) })
    }

    fn build_driver_list(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        driver_type: DriverType,
    ) -> DeviceResult<()> {
        let mut data = raw_record(record);
        check(unsafe { (self.build_driver_info_list)(raw_handle(list), &mut data, driver_type.code()) })
    }

    fn enumerate_driver(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        driver_type: DriverType,
        index: u32,
    ) -> DeviceResult<Option<Driver>> {
        let mut data = raw_record(record);
        let mut raw: SP_DRVINFO_DATA_V2_W = unsafe { mem::zeroed() };
        raw.cbSize = mem::size_of::<SP_DRVINFO_DATA_V2_W>() as DWORD;

        let ok = unsafe {
            (self.enum_driver_info)(raw_handle(list), &mut data, driver_type.code(), index, &mut raw)
        };
        if ok == 0 {
            return match unsafe { GetLastError() } {
                ERROR_NO_MORE_ITEMS => Ok(None),
                code => Err(DeviceError::from_win32(code)),
            };
        }

        Ok(Some(Driver {
            driver_type,
            description: utf16_to_string(&raw.Description)?,
            manufacturer: utf16_to_string(&raw.MfgName)?,
            provider: utf16_to_string(&raw.ProviderName)?,
            date: (raw.DriverDate.dwHighDateTime as u64) << 32 | raw.DriverDate.dwLowDateTime as u64,
            version: raw.DriverVersion,
        }))
    }

    fn destroy_driver_list(
        &self,
        list: DeviceListHandle,
        record: &DeviceRecord,
        driver_type: DriverType,
    ) -> DeviceResult<()> {
        let mut data = raw_record(record);
        check(unsafe {
            (self.destroy_driver_info_list)(raw_handle(list), &mut data, driver_type.code())
        })
    }

    fn class_guids_from_name(
        &self,
        name: &str,
        machine: Option<&str>,
        buffer: &mut [Guid],
    ) -> DeviceResult<BufferStatus<()>> {
        let name = U16CString::from_str(name).map_err(|_| DeviceError::InteriorNul(name.to_string()))?;
        let machine = wide(machine)?;
        let mut raw = vec![to_raw_guid(&Guid::default()); buffer.len()];
        let mut required: DWORD = 0;

        let ok = unsafe {
            (self.class_guids_from_name_ex)(
                name.as_ptr(),
                raw.as_mut_ptr(),
                raw.len() as DWORD,
                &mut required,
                wide_ptr(&machine),
                ptr::null_mut(),
            )
        };
        let status = fill(ok, required, ())?;

        if let BufferStatus::Filled { len, .. } = status {
            for (guid, raw) in buffer.iter_mut().zip(&raw[..len.min(raw.len())]) {
                *guid = from_raw_guid(raw);
            }
        }
        Ok(status)
    }
}
