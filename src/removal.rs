//! Device removal through the class installer.

use crate::flags::DiFunction;
use crate::{Device, DeviceResult};
use log::debug;
use serde::Serialize;

/// `DI_REMOVEDEVICE_*`, which hardware profiles a removal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalScope {
    /// Remove the device from every hardware profile.
    Global = 1,
    /// Remove the device from a single hardware profile.
    ConfigSpecific = 2,
}

impl RemovalScope {
    pub fn code(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalRequest {
    pub scope: RemovalScope,
    /// The hardware profile for [`RemovalScope::ConfigSpecific`]. Zero selects the current one.
    pub hardware_profile: u32,
}

/// The `SP_REMOVEDEVICE_PARAMS` payload, without the class install header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveDeviceParams {
    pub scope: RemovalScope,
    pub hardware_profile: u32,
}

/// Class installer parameters, tagged by the install function they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassInstallParams {
    Remove(RemoveDeviceParams),
}

impl ClassInstallParams {
    pub fn function(&self) -> DiFunction {
        match self {
            ClassInstallParams::Remove(_) => DiFunction::REMOVE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RemovalOutcome {
    /// The system must be restarted before the removal is complete.
    pub need_reboot: bool,
}

pub(crate) fn remove(device: Device<'_>, request: RemovalRequest) -> DeviceResult<RemovalOutcome> {
    let api = device.api();
    let (list, record) = device.sys();
    let params = ClassInstallParams::Remove(RemoveDeviceParams {
        scope: request.scope,
        hardware_profile: request.hardware_profile,
    });

    debug!(
        "Removing device {} with scope {:?}, hardware profile {}",
        record.dev_inst, request.scope, request.hardware_profile
    );
    api.set_class_install_params(list, &record, &params)?;
    api.call_class_installer(params.function(), list, &record)?;

    let need_reboot = match api.install_params(list, &record) {
        Ok(install) => install.flags.needs_reboot(),
        Err(e) => {
            debug!(
                "Device {} removed, but install parameters could not be read: {}",
                record.dev_inst, e
            );
            false
        }
    };

    debug!("Device {} removed, need reboot: {}", record.dev_inst, need_reboot);
    Ok(RemovalOutcome { need_reboot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::DiFlags;
    use crate::tests::fixtures::*;
    use crate::DeviceError;

    fn remove_first(api: &FakeApi, scope: RemovalScope, profile: u32) -> DeviceResult<RemovalOutcome> {
        Device::new(api, FAKE_LIST, api.record(0)).remove(scope, profile)
    }

    #[test]
    fn it_reports_reboot_flags() {
        let api = FakeApi::new(vec![FakeDevice::new("USB\\VID_1234\\1")]);
        api.set_install_flags(DiFlags::NEED_REBOOT);

        let outcome = remove_first(&api, RemovalScope::Global, 0).unwrap();

        assert!(outcome.need_reboot);
        assert_eq!(
            api.removals(),
            vec![(
                0,
                ClassInstallParams::Remove(RemoveDeviceParams {
                    scope: RemovalScope::Global,
                    hardware_profile: 0
                })
            )]
        );
    }

    #[test]
    fn it_reports_restart_as_reboot() {
        let api = FakeApi::new(vec![FakeDevice::new("USB\\VID_1234\\1")]);
        api.set_install_flags(DiFlags::NEED_RESTART | DiFlags::QUIET_INSTALL);

        assert!(remove_first(&api, RemovalScope::ConfigSpecific, 2).unwrap().need_reboot);
    }

    #[test]
    fn it_needs_no_reboot_without_flags() {
        let api = FakeApi::new(vec![FakeDevice::new("USB\\VID_1234\\1")]);

        assert!(!remove_first(&api, RemovalScope::Global, 0).unwrap().need_reboot);
    }

    #[test]
    fn it_succeeds_when_the_status_read_fails() {
        let api = FakeApi::new(vec![FakeDevice::new("USB\\VID_1234\\1")]);
        api.set_install_flags(DiFlags::NEED_REBOOT);
        api.fail_install_params(5);

        let outcome = remove_first(&api, RemovalScope::Global, 0).unwrap();

        assert_eq!(outcome, RemovalOutcome { need_reboot: false });
        assert_eq!(api.install_params_calls(), 1);
    }

    #[test]
    fn it_stops_when_the_installer_fails() {
        let api = FakeApi::new(vec![FakeDevice::new("USB\\VID_1234\\1")]);
        api.fail_installer(0xE000_020B);

        let result = remove_first(&api, RemovalScope::Global, 0);

        assert!(matches!(result, Err(DeviceError::Win32 { code: 0xE000_020B })));
        assert_eq!(api.install_params_calls(), 0);
    }

    #[test]
    fn it_stops_when_params_cannot_be_set() {
        let api = FakeApi::new(vec![FakeDevice::new("USB\\VID_1234\\1")]);
        api.fail_set_class_params(87);

        let result = remove_first(&api, RemovalScope::Global, 0);

        assert_eq!(result.unwrap_err().win32_code(), Some(87));
        assert_eq!(api.installer_calls(), 0);
        assert_eq!(api.install_params_calls(), 0);
    }

    #[test]
    fn it_serializes_outcomes() {
        let json = serde_json::to_string(&RemovalOutcome { need_reboot: true }).unwrap();
        assert_eq!(json, r#"{"need_reboot":true}"#);
    }
}
