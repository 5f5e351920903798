//! Device model: supported models, lookup, and the per-device handle.

use crate::class::{DeviceClass, LightingProtocol};
use crate::error::{Error, Result};
use crate::lighting::LightingState;
use crate::profile::Profile;
use crate::transport::HidTransport;
use crate::{pids, CORSAIR_VID};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Supported RGB mouse models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseModel {
    M65,
    SabreOptical,
    SabreLaser,
    Scimitar,
}

impl MouseModel {
    pub const ALL: &'static [MouseModel] = &[
        MouseModel::M65,
        MouseModel::SabreOptical,
        MouseModel::SabreLaser,
        MouseModel::Scimitar,
    ];

    /// Look up model from USB product ID.
    pub fn from_pid(pid: u16) -> Option<Self> {
        match pid {
            pids::M65 => Some(Self::M65),
            pids::SABRE_OPTICAL => Some(Self::SabreOptical),
            pids::SABRE_LASER => Some(Self::SabreLaser),
            pids::SCIMITAR => Some(Self::Scimitar),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::M65 => "Corsair M65 RGB",
            Self::SabreOptical => "Corsair Sabre RGB (optical)",
            Self::SabreLaser => "Corsair Sabre RGB (laser)",
            Self::Scimitar => "Corsair Scimitar RGB",
        }
    }

    /// USB Product ID.
    pub fn pid(&self) -> u16 {
        match self {
            Self::M65 => pids::M65,
            Self::SabreOptical => pids::SABRE_OPTICAL,
            Self::SabreLaser => pids::SABRE_LASER,
            Self::Scimitar => pids::SCIMITAR,
        }
    }

    /// Lighting packet family.
    pub fn class(&self) -> DeviceClass {
        DeviceClass::Mouse
    }
}

impl fmt::Display for MouseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Information about an attached device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub model: MouseModel,
    pub vid: u16,
    pub pid: u16,
    pub path: String,
    pub serial: Option<String>,
}

impl DeviceInfo {
    /// Info for a model with no backing device node.
    pub fn for_model(model: MouseModel) -> Self {
        Self {
            model,
            vid: CORSAIR_VID,
            pid: model.pid(),
            path: String::new(),
            serial: None,
        }
    }
}

/// Find the first attached supported mouse, optionally restricted to one product ID.
pub fn find_device(api: &hidapi::HidApi, pid: Option<u16>) -> Result<DeviceInfo> {
    debug!("Looking up supported HID device");
    for dev in api.device_list() {
        if dev.vendor_id() != CORSAIR_VID || pid.is_some_and(|p| p != dev.product_id()) {
            continue;
        }
        if let Some(model) = MouseModel::from_pid(dev.product_id()) {
            info!(
                model = model.name(),
                vid = format_args!("0x{:04X}", dev.vendor_id()),
                pid = format_args!("0x{:04X}", dev.product_id()),
                path = %dev.path().to_string_lossy(),
                "Found device"
            );
            return Ok(DeviceInfo {
                model,
                vid: dev.vendor_id(),
                pid: dev.product_id(),
                path: dev.path().to_string_lossy().into_owned(),
                serial: dev.serial_number().map(|s| s.to_string()),
            });
        }
    }
    Err(Error::DeviceNotFound(match pid {
        Some(p) => format!("no supported device with PID 0x{p:04X}"),
        None => "no supported device attached".to_string(),
    }))
}

/// One connected peripheral and the lighting state that belongs to it.
///
/// `profile` supplies the desired lighting (its selected mode); `last_light`
/// is what the device was last confirmed to show. Both are owned here so that
/// all state for one device travels with its handle.
pub struct DeviceHandle {
    pub info: DeviceInfo,
    class: DeviceClass,
    transport: Box<dyn HidTransport>,
    /// Inactive handles ignore synchronize requests.
    pub active: bool,
    pub profile: Profile,
    pub last_light: LightingState,
}

/// A device handle behind its per-device lock.
pub type SharedDevice = Arc<Mutex<DeviceHandle>>;

impl DeviceHandle {
    /// Attach a device. The first synchronize performs a full resync.
    pub fn new(info: DeviceInfo, transport: Box<dyn HidTransport>, profile: Profile) -> Self {
        let mut last_light = LightingState::dark();
        last_light.request_resync();
        Self {
            class: info.model.class(),
            info,
            transport,
            active: true,
            profile,
            last_light,
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn protocol(&self) -> &'static dyn LightingProtocol {
        self.class.protocol()
    }

    pub fn transport(&self) -> &dyn HidTransport {
        self.transport.as_ref()
    }

    /// Swap in a freshly loaded profile. Returns false if nothing changed.
    ///
    /// Resync requests do not survive a save/load, so a change of selected
    /// mode is re-flagged here.
    pub fn replace_profile(&mut self, mut fresh: Profile) -> bool {
        if fresh == self.profile {
            return false;
        }
        if fresh.current_index() != self.profile.current_index() {
            debug!(mode = fresh.current_index(), "Selected mode changed");
            fresh.current_mode_mut().lighting.request_resync();
        }
        self.profile = fresh;
        true
    }

    /// Split into the pieces a sync needs at once.
    pub(crate) fn sync_parts(
        &mut self,
    ) -> (
        &'static dyn LightingProtocol,
        &dyn HidTransport,
        &mut LightingState,
        &mut LightingState,
    ) {
        (
            self.class.protocol(),
            self.transport.as_ref(),
            &mut self.profile.current_mode_mut().lighting,
            &mut self.last_light,
        )
    }

    /// Wrap in the per-device lock.
    pub fn into_shared(self) -> SharedDevice {
        Arc::new(Mutex::new(self))
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("info", &self.info)
            .field("class", &self.class)
            .field("active", &self.active)
            .field("profile", &self.profile.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::MOUSE_ZONES;
    use crate::transport::mock::MockTransport;

    #[test]
    fn mouse_model_from_known_pid() {
        assert_eq!(MouseModel::from_pid(0x1B12), Some(MouseModel::M65));
        assert_eq!(MouseModel::from_pid(0x1B1E), Some(MouseModel::Scimitar));
    }

    #[test]
    fn mouse_model_from_unknown_pid() {
        assert_eq!(MouseModel::from_pid(0x1234), None);
    }

    #[test]
    fn pid_roundtrip() {
        for model in MouseModel::ALL {
            assert_eq!(MouseModel::from_pid(model.pid()), Some(*model));
            assert_eq!(model.class(), DeviceClass::Mouse);
        }
    }

    #[test]
    fn new_handle_is_active_and_forces_first_sync() {
        let dev = DeviceHandle::new(
            DeviceInfo::for_model(MouseModel::M65),
            Box::new(MockTransport::new()),
            Profile::default(),
        );
        assert!(dev.active);
        assert!(dev.last_light.force_update);
        assert!(dev.last_light.is_dark(MOUSE_ZONES));
        assert_eq!(dev.protocol().zone_range(), MOUSE_ZONES);
        assert_eq!(dev.info.vid, CORSAIR_VID);
    }

    #[test]
    fn replace_profile_flags_new_selection() {
        let mut dev = DeviceHandle::new(
            DeviceInfo::for_model(MouseModel::M65),
            Box::new(MockTransport::new()),
            Profile::default(),
        );
        assert!(!dev.replace_profile(Profile::default()));

        let mut fresh = Profile::default();
        let idx = fresh.add_mode("Second");
        fresh.select_mode(idx).unwrap();
        fresh.current_mode_mut().lighting.force_update = false;

        assert!(dev.replace_profile(fresh));
        assert_eq!(dev.profile.current_index(), idx);
        assert!(dev.profile.current_mode().lighting.force_update);
    }

    #[test]
    fn replace_profile_same_selection_keeps_flags_clear() {
        let mut dev = DeviceHandle::new(
            DeviceInfo::for_model(MouseModel::M65),
            Box::new(MockTransport::new()),
            Profile::default(),
        );
        let mut fresh = Profile::default();
        fresh.name = "Renamed".to_string();

        assert!(dev.replace_profile(fresh));
        assert_eq!(dev.profile.name, "Renamed");
        assert!(!dev.profile.current_mode().lighting.force_update);
    }

    #[test]
    fn debug_names_profile() {
        let dev = DeviceHandle::new(
            DeviceInfo::for_model(MouseModel::SabreOptical),
            Box::new(MockTransport::new()),
            Profile::new("Desk"),
        );
        let s = format!("{dev:?}");
        assert!(s.contains("Desk"));
        assert!(s.contains("SabreOptical"));
    }
}
