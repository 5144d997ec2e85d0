use crate::api::DeviceApi;
use crate::retrieve::retrieve;
use crate::{DeviceResult, Guid};
use log::debug;
use std::fmt;

/// A setup class identified by name, e.g. `Net` or `Bluetooth`.
///
/// Several classes may share a name, so a name resolves to a list of GUIDs.
/// A name that no class carries resolves to an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceClass {
    pub name: String,
    pub guids: Vec<Guid>,
}

impl DeviceClass {
    pub fn from_name(api: &dyn DeviceApi, name: &str, machine: Option<&str>) -> DeviceResult<Self> {
        let mut buffer = [Guid::default(); 1];
        let guids = retrieve(
            &mut buffer,
            |buffer| api.class_guids_from_name(name, machine, buffer),
            |_, guids| Ok(guids.to_vec()),
        )?;

        debug!("Class {:?} resolved to {} GUID(s)", name, guids.len());
        Ok(Self {
            name: name.to_string(),
            guids,
        })
    }

    /// The GUID of the class, if the name resolved to exactly one.
    pub fn unique_guid(&self) -> Option<Guid> {
        match self.guids.as_slice() {
            [guid] => Some(*guid),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}
