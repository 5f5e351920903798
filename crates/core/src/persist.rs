//! Persistence codec: zone colours in the device's own non-volatile storage.
//!
//! Unlike live updates, storage is addressed one zone at a time: a save sends
//! one report per zone, a load performs one request/reply exchange per zone.
//! Zones are always visited in ascending order.

use crate::color::Rgb;
use crate::device::DeviceHandle;
use crate::error::{Error, Result};
use crate::lighting::LightingState;
use crate::transport;
use tracing::debug;

/// Write every zone of the device's class from `light` into device storage.
///
/// Stops at the first failed send; zones already written stay written.
pub fn save_to_device(device: &DeviceHandle, light: &LightingState) -> Result<()> {
    let protocol = device.protocol();
    let range = protocol.zone_range();
    let colors = light.range(range);

    for (zone, &color) in range.zone_numbers().zip(colors) {
        let report = protocol.encode_save(zone, color)?;
        transport::send(device.transport(), &report)?;
    }

    debug!(zones = range.count, "Saved lighting to device");
    Ok(())
}

/// Read every zone of the device's class from device storage.
///
/// The returned state holds the stored colours in the class's range and
/// black everywhere else.
pub fn load_from_device(device: &DeviceHandle) -> Result<LightingState> {
    let mut light = LightingState::dark();
    load_into(device, &mut light)?;
    Ok(light)
}

/// Read the device's stored zones into the class's range of `light`.
///
/// `light` is only modified once every zone has been read and validated.
pub fn load_into(device: &DeviceHandle, light: &mut LightingState) -> Result<()> {
    let protocol = device.protocol();
    let range = protocol.zone_range();
    let mut colors: Vec<Rgb> = Vec::with_capacity(range.count);

    for zone in range.zone_numbers() {
        let request = protocol.encode_load(zone)?;
        let reply = transport::exchange(device.transport(), &request)?;
        let decoded = protocol.decode_load(&reply);

        if decoded.header != request.header() {
            return Err(Error::ProtocolMismatch {
                zone,
                expected: request.header(),
                actual: decoded.header,
            });
        }
        colors.push(decoded.color);
    }

    light.range_mut(range).copy_from_slice(&colors);
    debug!(zones = range.count, "Loaded lighting from device");
    Ok(())
}
