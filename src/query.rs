use crate::api::{DeviceApi, DeviceListHandle};
use crate::flags::ClassDevsFlags;
use crate::selector::Selector;
use crate::{Device, DeviceResult, Guid};
use log::{debug, trace, warn};

/// Describes a set of devices.
///
/// A query opens a fresh device list every time it is executed, so it can be
/// reused for any number of [`each`](Query::each) and [`count`](Query::count) calls.
///
/// ```no_run
/// # #[cfg(windows)]
/// # fn main() -> windevice::DeviceResult<()> {
/// use windevice::{ClassDevsFlags, Query, Selector, StringMatcher};
///
/// let query = Query::new()
///     .with_enumerator("USB")
///     .with_flags(ClassDevsFlags::PRESENT)
///     .with_selector(Selector::description(StringMatcher::contains_fold("hub")));
///
/// query.each(|device| {
///     println!("{}", device.instance_id()?);
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// # #[cfg(not(windows))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Only devices of this setup class. `None` means every class.
    pub class: Option<Guid>,
    /// Only devices of this enumerator, e.g. `PCI` or `USB`, or this device instance ID.
    pub enumerator: Option<String>,
    pub flags: ClassDevsFlags,
    /// Name of a remote computer. `None` means the local one.
    pub machine: Option<String>,
    /// Devices the selector rejects are skipped.
    pub selector: Option<Selector>,
}

/// Releases a device list when dropped.
struct DeviceList<'a> {
    api: &'a dyn DeviceApi,
    handle: DeviceListHandle,
}

impl Drop for DeviceList<'_> {
    fn drop(&mut self) {
        debug!("Closing device list {:?}", self.handle);
        if let Err(e) = self.api.close_device_list(self.handle) {
            warn!("Failed to close device list {:?}: {}", self.handle, e);
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: Guid) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_enumerator(mut self, enumerator: impl Into<String>) -> Self {
        self.enumerator = Some(enumerator.into());
        self
    }

    pub fn with_flags(mut self, flags: ClassDevsFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = Some(machine.into());
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// The flags the device list is opened with.
    pub fn effective_flags(&self) -> ClassDevsFlags {
        match self.class {
            Some(_) => self.flags,
            None => self.flags | ClassDevsFlags::ALL_CLASSES,
        }
    }

    /// Call `action` for every selected device, in enumeration order, using `api`.
    ///
    /// Enumeration stops at the first error returned by the platform, the selector
    /// or `action`. The device list is released on every exit path.
    pub fn each_with<F>(&self, api: &dyn DeviceApi, mut action: F) -> DeviceResult<()>
    where
        F: FnMut(Device<'_>) -> DeviceResult<()>,
    {
        let flags = self.effective_flags();
        let handle = api.open_device_list(
            self.class.as_ref(),
            self.enumerator.as_deref(),
            flags,
            self.machine.as_deref(),
        )?;
        debug!("Opened device list {:?} with flags {}", handle, flags);

        let list = DeviceList { api, handle };

        let mut index = 0;
        while let Some(record) = list.api.enumerate_device(list.handle, index)? {
            trace!("Device {} has devnode {}", index, record.dev_inst);
            index += 1;

            let device = Device::new(list.api, list.handle, record);
            let selected = match &self.selector {
                Some(selector) => selector.select(device)?,
                None => true,
            };

            if selected {
                action(device)?;
            }
        }

        debug!("Device list {:?} exhausted after {} devices", handle, index);
        Ok(())
    }

    /// The number of devices `each_with` would visit.
    pub fn count_with(&self, api: &dyn DeviceApi) -> DeviceResult<usize> {
        let mut count = 0;
        self.each_with(api, |_| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }

    /// Call `action` for every selected device on this system.
    #[cfg(windows)]
    pub fn each<F>(&self, action: F) -> DeviceResult<()>
    where
        F: FnMut(Device<'_>) -> DeviceResult<()>,
    {
        self.each_with(crate::setupapi::SetupApi::load()?, action)
    }

    /// The number of selected devices on this system.
    #[cfg(windows)]
    pub fn count(&self) -> DeviceResult<usize> {
        self.count_with(crate::setupapi::SetupApi::load()?)
    }
}
