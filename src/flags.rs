//! Flag sets and codes passed to and returned from SetupAPI.

use std::fmt;

bitflags::bitflags! {
    /// `DIGCF_*` flags controlling which devices a device list contains.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassDevsFlags: u32 {
        const DEFAULT = 0x0000_0001;
        /// Only devices that are currently present.
        const PRESENT = 0x0000_0002;
        /// Devices of every setup class. Added automatically when a query has no class.
        const ALL_CLASSES = 0x0000_0004;
        /// Only devices in the current hardware profile.
        const PROFILE = 0x0000_0008;
        const DEVICE_INTERFACE = 0x0000_0010;
    }
}

bitflags::bitflags! {
    /// `DI_*` device installation flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DiFlags: u32 {
        const SHOW_OEM = 0x0000_0001;
        const SHOW_COMPAT = 0x0000_0002;
        const SHOW_CLASS = 0x0000_0004;
        const NO_VCP = 0x0000_0008;
        const DID_COMPAT = 0x0000_0010;
        const DID_CLASS = 0x0000_0020;
        const AUTO_ASSIGN_RES = 0x0000_0040;
        const NEED_RESTART = 0x0000_0080;
        const NEED_REBOOT = 0x0000_0100;
        const NO_BROWSE = 0x0000_0200;
        const MULTI_MFGS = 0x0000_0400;
        const DISABLED = 0x0000_0800;
        const GENERAL_PAGE_ADDED = 0x0000_1000;
        const RESOURCE_PAGE_ADDED = 0x0000_2000;
        const PROPERTIES_CHANGE = 0x0000_4000;
        const ENUM_SINGLE_INF = 0x0001_0000;
        const DONOT_CALL_CONFIG_MG = 0x0002_0000;
        const INSTALL_DISABLED = 0x0004_0000;
        const COMPAT_FROM_CLASS = 0x0008_0000;
        const CLASS_INSTALL_PARAMS = 0x0010_0000;
        const NODI_DEFAULT_ACTION = 0x0020_0000;
        const QUIET_INSTALL = 0x0080_0000;
        const NO_FILE_COPY = 0x0100_0000;
        const FORCE_COPY = 0x0200_0000;
        const DRIVER_PAGE_ADDED = 0x0400_0000;
        const USE_CI_SELECT_STRINGS = 0x0800_0000;
        const OVERRIDE_INF_FLAGS = 0x1000_0000;
        const PROPS_NO_CHANGE_SHOWN = 0x2000_0000;
        const NO_SELECT_ICONS = 0x4000_0000;
        const NO_WRITE_IDS = 0x8000_0000;
    }
}

impl DiFlags {
    /// Whether the system must be restarted for changes to take effect.
    pub fn needs_reboot(self) -> bool {
        self.intersects(DiFlags::NEED_REBOOT | DiFlags::NEED_RESTART)
    }
}

bitflags::bitflags! {
    /// `DI_FLAGSEX_*` extended device installation flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DiFlagsEx: u32 {
        const CI_FAILED = 0x0000_0004;
        const FINISH_INSTALL_ACTION = 0x0000_0008;
        const DID_INFO_LIST = 0x0000_0010;
        const DID_COMPAT_INFO = 0x0000_0020;
        const FILTER_CLASSES = 0x0000_0040;
        const SET_FAILED_INSTALL = 0x0000_0080;
        const DEVICE_CHANGE = 0x0000_0100;
        const ALWAYS_WRITE_IDS = 0x0000_0200;
        const PROPCHANGE_PENDING = 0x0000_0400;
        const ALLOW_EXCLUDED_DRIVERS = 0x0000_0800;
        const NO_UI_ON_QUERY_REMOVE = 0x0000_1000;
        const USE_CLASS_FOR_COMPAT = 0x0000_2000;
        const NO_DRVREG_MODIFY = 0x0000_8000;
        const IN_SYSTEM_SETUP = 0x0001_0000;
        const INET_DRIVER = 0x0002_0000;
        const APPEND_DRIVER_LIST = 0x0004_0000;
        const PREINSTALL_BACKUP = 0x0008_0000;
        const BACKUP_ON_REPLACE = 0x0010_0000;
        const DRIVER_LIST_FROM_URL = 0x0020_0000;
        const EXCLUDE_OLD_INET_DRIVERS = 0x0080_0000;
        const POWER_PAGE_ADDED = 0x0100_0000;
        const FILTER_SIMILAR_DRIVERS = 0x0200_0000;
        const INSTALLED_DRIVER = 0x0400_0000;
        const NO_CLASSLIST_NODE_MERGE = 0x0800_0000;
        const ALT_PLATFORM_DRVSEARCH = 0x1000_0000;
        const RESTART_DEVICE_ONLY = 0x2000_0000;
        const RECURSIVE_SEARCH = 0x4000_0000;
        const SEARCH_PUBLISHED_INFS = 0x8000_0000;
    }
}

macro_rules! impl_display_for_flags {
    ($($flags:ty),*) => {
        $(
            impl fmt::Display for $flags {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    bitflags::parser::to_writer(self, f)
                }
            }
        )*
    };
}

impl_display_for_flags!(ClassDevsFlags, DiFlags, DiFlagsEx);

/// Install parameters of a device, the `Flags` and `FlagsEx` members of `SP_DEVINSTALL_PARAMS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallParams {
    pub flags: DiFlags,
    pub flags_ex: DiFlagsEx,
}

/// A class installer function code (`DIF_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiFunction(pub u32);

impl DiFunction {
    pub const SELECT_DEVICE: DiFunction = DiFunction(0x01);
    pub const INSTALL_DEVICE: DiFunction = DiFunction(0x02);
    pub const ASSIGN_RESOURCES: DiFunction = DiFunction(0x03);
    pub const PROPERTIES: DiFunction = DiFunction(0x04);
    pub const REMOVE: DiFunction = DiFunction(0x05);
    pub const FIRST_TIME_SETUP: DiFunction = DiFunction(0x06);
    pub const SELECT_BEST_COMPAT_DRV: DiFunction = DiFunction(0x17);
    pub const PROPERTY_CHANGE: DiFunction = DiFunction(0x12);
    pub const UNREMOVE: DiFunction = DiFunction(0x16);

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            DiFunction::SELECT_DEVICE => "DIF_SELECTDEVICE",
            DiFunction::INSTALL_DEVICE => "DIF_INSTALLDEVICE",
            DiFunction::ASSIGN_RESOURCES => "DIF_ASSIGNRESOURCES",
            DiFunction::PROPERTIES => "DIF_PROPERTIES",
            DiFunction::REMOVE => "DIF_REMOVE",
            DiFunction::FIRST_TIME_SETUP => "DIF_FIRSTTIMESETUP",
            DiFunction::SELECT_BEST_COMPAT_DRV => "DIF_SELECTBESTCOMPATDRV",
            DiFunction::PROPERTY_CHANGE => "DIF_PROPERTYCHANGE",
            DiFunction::UNREMOVE => "DIF_UNREMOVE",
            _ => return None,
        })
    }
}

impl fmt::Display for DiFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "DIF_{:#x}", self.0),
        }
    }
}
