pub mod fixtures {
    use crate::api::{BufferStatus, DeviceApi, DeviceListHandle, DeviceRecord};
    use crate::codec::{encode_string, encode_string_list};
    use crate::driver::{Driver, DriverType};
    use crate::flags::{ClassDevsFlags, DiFlags, DiFlagsEx, DiFunction, InstallParams};
    use crate::property::{PropertyId, RegistryType};
    use crate::removal::ClassInstallParams;
    use crate::{DeviceError, DeviceResult, Guid};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    pub const FAKE_LIST: DeviceListHandle = DeviceListHandle(0x5e7);

    /// One device held by [`FakeApi`].
    #[derive(Debug, Clone, Default)]
    pub struct FakeDevice {
        pub instance_id: String,
        pub properties: HashMap<PropertyId, (u32, Vec<u8>)>,
        pub drivers: Vec<Driver>,
    }

    impl FakeDevice {
        pub fn new(instance_id: &str) -> Self {
            Self {
                instance_id: instance_id.to_string(),
                ..Default::default()
            }
        }

        pub fn with_raw(mut self, property: PropertyId, reg_type: u32, data: Vec<u8>) -> Self {
            self.properties.insert(property, (reg_type, data));
            self
        }

        pub fn with_string(self, property: PropertyId, value: &str) -> Self {
            self.with_raw(property, RegistryType::REG_SZ, encode_string(value))
        }

        pub fn with_strings(self, property: PropertyId, values: &[&str]) -> Self {
            self.with_raw(property, RegistryType::REG_MULTI_SZ, encode_string_list(values))
        }

        pub fn with_u32(self, property: PropertyId, value: u32) -> Self {
            self.with_raw(
                property,
                RegistryType::REG_DWORD_LITTLE_ENDIAN,
                value.to_le_bytes().to_vec(),
            )
        }

        pub fn with_drivers(mut self, drivers: Vec<Driver>) -> Self {
            self.drivers = drivers;
            self
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct OpenCall {
        pub class: Option<Guid>,
        pub enumerator: Option<String>,
        pub flags: ClassDevsFlags,
        pub machine: Option<String>,
    }

    /// An in-memory [`DeviceApi`] that records how it is called.
    ///
    /// Device records carry the device's index as their devnode.
    #[derive(Default)]
    pub struct FakeApi {
        devices: Vec<FakeDevice>,
        classes: HashMap<String, Vec<Guid>>,
        install_params: Cell<InstallParams>,

        fail_open: Cell<Option<u32>>,
        fail_close: Cell<Option<u32>>,
        fail_enumerate_at: Cell<Option<(u32, u32)>>,
        fail_set_class_params: Cell<Option<u32>>,
        fail_installer: Cell<Option<u32>>,
        fail_install_params: Cell<Option<u32>>,

        open_calls: RefCell<Vec<OpenCall>>,
        lists_opened: Cell<usize>,
        lists_closed: Cell<usize>,
        enumerate_calls: Cell<usize>,
        property_calls: Cell<usize>,
        installer_calls: Cell<usize>,
        install_params_calls: Cell<usize>,
        removals: RefCell<Vec<(u32, ClassInstallParams)>>,
        written_install_params: RefCell<Vec<InstallParams>>,
        driver_lists_built: RefCell<Vec<DriverType>>,
        driver_lists_destroyed: Cell<usize>,
        class_lookup_sizes: RefCell<Vec<usize>>,
    }

    fn fail(knob: &Cell<Option<u32>>) -> DeviceResult<()> {
        match knob.get() {
            Some(code) => Err(DeviceError::from_win32(code)),
            None => Ok(()),
        }
    }

    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }

    impl FakeApi {
        pub fn new(devices: Vec<FakeDevice>) -> Self {
            Self {
                devices,
                ..Default::default()
            }
        }

        /// Register a setup class name. Lookups ignore case.
        pub fn with_class(mut self, name: &str, guids: Vec<Guid>) -> Self {
            self.classes.insert(name.to_lowercase(), guids);
            self
        }

        pub fn record(&self, index: usize) -> DeviceRecord {
            DeviceRecord {
                class_guid: Guid::default(),
                dev_inst: index as u32,
                reserved: 0,
            }
        }

        fn device(&self, record: &DeviceRecord) -> DeviceResult<&FakeDevice> {
            self.devices
                .get(record.dev_inst as usize)
                .ok_or(DeviceError::InvalidHandle)
        }

        pub fn set_install_flags(&self, flags: DiFlags) {
            let mut params = self.install_params.get();
            params.flags = flags;
            self.install_params.set(params);
        }

        pub fn set_install_flags_ex(&self, flags_ex: DiFlagsEx) {
            let mut params = self.install_params.get();
            params.flags_ex = flags_ex;
            self.install_params.set(params);
        }

        pub fn fail_open(&self, code: u32) {
            self.fail_open.set(Some(code));
        }

        pub fn fail_close(&self, code: u32) {
            self.fail_close.set(Some(code));
        }

        pub fn fail_enumerate_at(&self, index: u32, code: u32) {
            self.fail_enumerate_at.set(Some((index, code)));
        }

        pub fn fail_set_class_params(&self, code: u32) {
            self.fail_set_class_params.set(Some(code));
        }

        pub fn fail_installer(&self, code: u32) {
            self.fail_installer.set(Some(code));
        }

        pub fn fail_install_params(&self, code: u32) {
            self.fail_install_params.set(Some(code));
        }

        pub fn open_calls(&self) -> Vec<OpenCall> {
            self.open_calls.borrow().clone()
        }

        pub fn lists_opened(&self) -> usize {
            self.lists_opened.get()
        }

        pub fn lists_closed(&self) -> usize {
            self.lists_closed.get()
        }

        pub fn enumerate_calls(&self) -> usize {
            self.enumerate_calls.get()
        }

        pub fn property_calls(&self) -> usize {
            self.property_calls.get()
        }

        pub fn installer_calls(&self) -> usize {
            self.installer_calls.get()
        }

        pub fn install_params_calls(&self) -> usize {
            self.install_params_calls.get()
        }

        pub fn removals(&self) -> Vec<(u32, ClassInstallParams)> {
            self.removals.borrow().clone()
        }

        pub fn written_install_params(&self) -> Vec<InstallParams> {
            self.written_install_params.borrow().clone()
        }

        pub fn driver_lists_built(&self) -> Vec<DriverType> {
            self.driver_lists_built.borrow().clone()
        }

        pub fn driver_lists_destroyed(&self) -> usize {
            self.driver_lists_destroyed.get()
        }

        pub fn class_lookup_sizes(&self) -> Vec<usize> {
            self.class_lookup_sizes.borrow().clone()
        }
    }

    impl DeviceApi for FakeApi {
        fn open_device_list(
            &self,
            class: Option<&Guid>,
            enumerator: Option<&str>,
            flags: ClassDevsFlags,
            machine: Option<&str>,
        ) -> DeviceResult<DeviceListHandle> {
            self.open_calls.borrow_mut().push(OpenCall {
                class: class.copied(),
                enumerator: enumerator.map(str::to_string),
                flags,
                machine: machine.map(str::to_string),
            });
            fail(&self.fail_open)?;
            bump(&self.lists_opened);
            Ok(FAKE_LIST)
        }

        fn enumerate_device(
            &self,
            list: DeviceListHandle,
            index: u32,
        ) -> DeviceResult<Option<DeviceRecord>> {
            assert_eq!(list, FAKE_LIST);
            bump(&self.enumerate_calls);
            if let Some((at, code)) = self.fail_enumerate_at.get() {
                if at == index {
                    return Err(DeviceError::from_win32(code));
                }
            }
            if (index as usize) < self.devices.len() {
                Ok(Some(self.record(index as usize)))
            } else {
                Ok(None)
            }
        }

        fn close_device_list(&self, list: DeviceListHandle) -> DeviceResult<()> {
            assert_eq!(list, FAKE_LIST);
            bump(&self.lists_closed);
            fail(&self.fail_close)
        }

        fn registry_property(
            &self,
            _list: DeviceListHandle,
            record: &DeviceRecord,
            property: PropertyId,
            buffer: &mut [u8],
        ) -> DeviceResult<BufferStatus<u32>> {
            bump(&self.property_calls);
            let (reg_type, data) = self
                .device(record)?
                .properties
                .get(&property)
                .ok_or(DeviceError::PropertyAbsent)?;

            if buffer.len() < data.len() {
                return Ok(BufferStatus::TooSmall {
                    required: data.len(),
                });
            }
            buffer[..data.len()].copy_from_slice(data);
            Ok(BufferStatus::Filled {
                len: data.len(),
                meta: *reg_type,
            })
        }

        fn instance_id(&self, _list: DeviceListHandle, record: &DeviceRecord) -> DeviceResult<String> {
            Ok(self.device(record)?.instance_id.clone())
        }

        fn set_class_install_params(
            &self,
            _list: DeviceListHandle,
            record: &DeviceRecord,
            params: &ClassInstallParams,
        ) -> DeviceResult<()> {
            fail(&self.fail_set_class_params)?;
            self.removals.borrow_mut().push((record.dev_inst, *params));
            Ok(())
        }

        fn call_class_installer(
            &self,
            function: DiFunction,
            _list: DeviceListHandle,
            _record: &DeviceRecord,
        ) -> DeviceResult<()> {
            assert_eq!(function, DiFunction::REMOVE);
            bump(&self.installer_calls);
            fail(&self.fail_installer)
        }

        fn install_params(
            &self,
            _list: DeviceListHandle,
            _record: &DeviceRecord,
        ) -> DeviceResult<InstallParams> {
            bump(&self.install_params_calls);
            fail(&self.fail_install_params)?;
            Ok(self.install_params.get())
        }

        fn set_install_params(
            &self,
            _list: DeviceListHandle,
            _record: &DeviceRecord,
            params: InstallParams,
        ) -> DeviceResult<()> {
            self.written_install_params.borrow_mut().push(params);
            self.install_params.set(params);
            Ok(())
        }

        fn build_driver_list(
            &self,
            _list: DeviceListHandle,
            _record: &DeviceRecord,
            driver_type: DriverType,
        ) -> DeviceResult<()> {
            self.driver_lists_built.borrow_mut().push(driver_type);
            Ok(())
        }

        fn enumerate_driver(
            &self,
            _list: DeviceListHandle,
            record: &DeviceRecord,
            _driver_type: DriverType,
            index: u32,
        ) -> DeviceResult<Option<Driver>> {
            Ok(self.device(record)?.drivers.get(index as usize).cloned())
        }

        fn destroy_driver_list(
            &self,
            _list: DeviceListHandle,
            _record: &DeviceRecord,
            _driver_type: DriverType,
        ) -> DeviceResult<()> {
            bump(&self.driver_lists_destroyed);
            Ok(())
        }

        fn class_guids_from_name(
            &self,
            name: &str,
            _machine: Option<&str>,
            buffer: &mut [Guid],
        ) -> DeviceResult<BufferStatus<()>> {
            self.class_lookup_sizes.borrow_mut().push(buffer.len());
            let guids = match self.classes.get(&name.to_lowercase()) {
                Some(guids) => guids,
                None => return Ok(BufferStatus::Filled { len: 0, meta: () }),
            };
            if buffer.len() < guids.len() {
                return Ok(BufferStatus::TooSmall {
                    required: guids.len(),
                });
            }
            buffer[..guids.len()].copy_from_slice(guids);
            Ok(BufferStatus::Filled {
                len: guids.len(),
                meta: (),
            })
        }
    }
}
