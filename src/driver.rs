//! Drivers affiliated with a device.
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> windevice::DeviceResult<()> {
//! use windevice::Query;
//!
//! Query::new().each(|device| {
//!     device.installed_driver().each(|driver| {
//!         println!("{} {}", driver.description, driver.version_string());
//!         Ok(())
//!     })
//! })?;
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```

use crate::api::{DeviceApi, DeviceListHandle, DeviceRecord};
use crate::flags::DiFlagsEx;
use crate::{Device, DeviceResult};
use log::{debug, trace, warn};
use serde::Serialize;

/// `SPDIT_*`, the kind of driver list to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DriverType {
    /// Drivers of the device's setup class.
    Class = 1,
    /// Drivers compatible with the device.
    Compatible = 2,
}

impl DriverType {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Describes which drivers a [`DriverSet`] contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverQuery {
    pub driver_type: DriverType,
    /// Merged into the device's extended install flags before the list is built.
    pub flags_ex: DiFlagsEx,
}

impl DriverQuery {
    pub fn new(driver_type: DriverType) -> Self {
        Self {
            driver_type,
            flags_ex: DiFlagsEx::empty(),
        }
    }

    /// The query for the driver currently installed on a device.
    pub fn installed() -> Self {
        Self::new(DriverType::Class)
            .with_flags_ex(DiFlagsEx::INSTALLED_DRIVER | DiFlagsEx::ALLOW_EXCLUDED_DRIVERS)
    }

    pub fn with_flags_ex(mut self, flags_ex: DiFlagsEx) -> Self {
        self.flags_ex = flags_ex;
        self
    }
}

/// Information about one driver, from `SP_DRVINFO_DATA_V2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Driver {
    pub driver_type: DriverType,
    pub description: String,
    pub manufacturer: String,
    pub provider: String,
    /// The driver date as a `FILETIME`, in 100ns intervals since 1601-01-01.
    pub date: u64,
    /// Four 16-bit version components packed from most to least significant.
    pub version: u64,
}

/// Seconds between 1601-01-01 and 1970-01-01.
#[cfg(feature = "chrono")]
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;

impl Driver {
    pub fn version_parts(&self) -> [u16; 4] {
        [
            (self.version >> 48) as u16,
            (self.version >> 32) as u16,
            (self.version >> 16) as u16,
            self.version as u16,
        ]
    }

    /// The version in dotted form, e.g. `10.0.19041.1`.
    pub fn version_string(&self) -> String {
        let [a, b, c, d] = self.version_parts();
        format!("{}.{}.{}.{}", a, b, c, d)
    }

    /// The driver date, or `None` if it is not set.
    #[cfg(feature = "chrono")]
    pub fn date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        if self.date == 0 {
            return None;
        }
        let secs = (self.date / 10_000_000) as i64 - FILETIME_UNIX_OFFSET;
        let nanos = (self.date % 10_000_000) as u32 * 100;
        chrono::DateTime::from_timestamp(secs, nanos)
    }
}

/// The drivers the platform associates with one device.
#[derive(Debug, Clone, Copy)]
pub struct DriverSet<'a> {
    device: Device<'a>,
    query: DriverQuery,
}

/// Destroys a built driver list when dropped.
struct DriverList<'a> {
    api: &'a dyn DeviceApi,
    list: DeviceListHandle,
    record: DeviceRecord,
    driver_type: DriverType,
}

impl Drop for DriverList<'_> {
    fn drop(&mut self) {
        debug!(
            "Destroying {:?} driver list of device {}",
            self.driver_type, self.record.dev_inst
        );
        if let Err(e) = self
            .api
            .destroy_driver_list(self.list, &self.record, self.driver_type)
        {
            warn!("Failed to destroy driver list: {}", e);
        }
    }
}

impl<'a> DriverSet<'a> {
    pub(crate) fn new(device: Device<'a>, query: DriverQuery) -> Self {
        Self { device, query }
    }

    pub fn query(&self) -> DriverQuery {
        self.query
    }

    /// Call `action` for each driver in the set, in the order the platform reports them.
    ///
    /// Stops at and returns the first error from the platform or from `action`.
    pub fn each<F>(&self, mut action: F) -> DeviceResult<()>
    where
        F: FnMut(Driver) -> DeviceResult<()>,
    {
        let api = self.device.api();
        let (list, record) = self.device.sys();
        let driver_type = self.query.driver_type;

        if !self.query.flags_ex.is_empty() {
            let mut params = api.install_params(list, &record)?;
            params.flags_ex |= self.query.flags_ex;
            api.set_install_params(list, &record, params)?;
        }

        debug!(
            "Building {:?} driver list of device {}",
            driver_type, record.dev_inst
        );
        api.build_driver_list(list, &record, driver_type)?;
        let _guard = DriverList {
            api,
            list,
            record,
            driver_type,
        };

        let mut index = 0;
        while let Some(driver) = api.enumerate_driver(list, &record, driver_type, index)? {
            trace!("Driver {}: {}", index, driver.description);
            index += 1;
            action(driver)?;
        }

        Ok(())
    }

    pub fn count(&self) -> DeviceResult<usize> {
        let mut count = 0;
        self.each(|_| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }

    pub fn collect(&self) -> DeviceResult<Vec<Driver>> {
        let mut drivers = vec![];
        self.each(|driver| {
            drivers.push(driver);
            Ok(())
        })?;
        Ok(drivers)
    }
}
