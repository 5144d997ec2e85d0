//! # windevice
//!
//! [SetupAPI] is the Windows API for enumerating and configuring devices.
//! This crate provides a high level Rust API for listing devices, reading their registry
//! properties, looking up their drivers and removing them.
//!
//! Devices are found by executing a [`Query`], which opens a device list, visits every device
//! the [`Selector`] accepts, and releases the list when it is done.
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> windevice::DeviceResult<()> {
//! use windevice::{ClassDevsFlags, Query};
//!
//! Query::new().with_flags(ClassDevsFlags::PRESENT).each(|device| {
//!     println!("{}: {}", device.instance_id()?, device.description()?);
//!     Ok(())
//! })?;
//! #   Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! A [`Device`] borrows the device list it came from, so it is only available inside the
//! callback. Copy out whatever is needed later.
//!
//! # Filtering
//!
//! The class and enumerator filters are applied by the platform. Everything else is
//! expressed as a [`Selector`] built from [`StringMatcher`]s.
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> windevice::DeviceResult<()> {
//! use windevice::{Query, Selector, StringMatcher};
//!
//! let query = Query::new().with_selector(Selector::all(vec![
//!     Selector::class(StringMatcher::equal_fold("net")),
//!     Selector::any(vec![
//!         Selector::description(StringMatcher::contains("Ethernet")),
//!         Selector::friendly_name(StringMatcher::contains("Ethernet")),
//!     ]),
//! ]));
//!
//! println!("{} ethernet adapters", query.count()?);
//! #   Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! A selector treats a property the device does not have as an empty string.
//!
//! # Removing devices
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> windevice::DeviceResult<()> {
//! use windevice::{Query, RemovalScope, Selector, StringMatcher};
//!
//! let query = Query::new().with_selector(Selector::id(StringMatcher::equal_fold("ROOT\\NET\\0001")));
//!
//! query.each(|device| {
//!     if device.remove(RemovalScope::Global, 0)?.need_reboot {
//!         println!("reboot required");
//!     }
//!     Ok(())
//! })?;
//! #   Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! [SetupAPI]: https://learn.microsoft.com/en-us/windows-hardware/drivers/install/setupapi
//!
//! # Internals
//!
//! All platform calls go through the [`DeviceApi`](api::DeviceApi) trait. On Windows it is
//! implemented by [`SetupApi`](setupapi::SetupApi), which loads `setupapi.dll` on first use.
//! [`Query::each_with`] accepts any implementation, which is how the query engine is tested
//! on other platforms.
//!
//! Properties are read into a stack buffer first and retried with a larger buffer when the
//! platform asks for one, see [`retrieve`](retrieve::retrieve). The raw bytes are decoded
//! according to their registry type tag in the [`codec`] module.

pub mod api;
mod class;
pub mod codec;
mod device;
pub mod driver;
pub mod flags;
mod guid;
pub mod property;
mod query;
pub mod removal;
pub mod retrieve;
mod selector;
#[cfg(windows)]
pub mod setupapi;
mod strmatch;
pub mod utils;

#[cfg(any(test, feature = "test"))]
pub mod tests;

pub use class::DeviceClass;
pub use device::Device;
pub use driver::{Driver, DriverQuery, DriverSet, DriverType};
pub use flags::{ClassDevsFlags, DiFlags, DiFlagsEx, DiFunction, InstallParams};
pub use guid::{Guid, ParseGuidError};
pub use property::{InstallState, PropertyId, PropertyValue};
pub use query::Query;
pub use removal::{RemovalOutcome, RemovalRequest, RemovalScope};
pub use selector::Selector;
pub use strmatch::StringMatcher;
pub use utils::{DeviceError, DeviceResult};

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
