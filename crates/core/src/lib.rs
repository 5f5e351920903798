//! hidlight-core: lighting state synchronization for RGB USB HID peripherals.
//!
//! This crate reconciles the lighting a profile asks for with the lighting a
//! device was last confirmed to show, and emits the minimal sequence of HID
//! reports to close the gap. It also reads and writes the zone colours kept
//! in the device's own storage.

pub mod class;
pub mod color;
pub mod comm;
pub mod device;
pub mod error;
#[cfg(test)]
mod integration_tests;
pub mod lighting;
pub mod packet;
pub mod persist;
pub mod profile;
pub mod safety;
pub mod scheduler;
pub mod sync;
pub mod transport;

/// Corsair USB Vendor ID.
pub const CORSAIR_VID: u16 = 0x1B1C;

/// Known RGB mouse product IDs.
pub mod pids {
    /// M65 RGB.
    pub const M65: u16 = 0x1B12;
    /// Sabre RGB, optical sensor.
    pub const SABRE_OPTICAL: u16 = 0x1B14;
    /// Sabre RGB, laser sensor.
    pub const SABRE_LASER: u16 = 0x1B19;
    /// Scimitar RGB.
    pub const SCIMITAR: u16 = 0x1B1E;
}
