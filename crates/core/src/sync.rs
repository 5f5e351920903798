//! Diff & update engine: drive a device's lighting towards its profile.
//!
//! A synchronize compares the selected mode's lighting against the last state
//! confirmed on the device, restricted to the device class's zones, and sends
//! at most two reports:
//!   1. one colour update carrying every zone of the class
//!   2. an activation report, only when the class turns dark, leaves dark,
//!      or a resync was forced
//!
//! Toggling the lighting hardware on every colour change is avoided; only
//! dark/lit transitions touch it.

use crate::device::DeviceHandle;
use crate::error::Result;
use crate::lighting::{LightingState, ZoneRange};
use crate::transport;
use tracing::{debug, trace};

/// Whether `current` must be transmitted.
///
/// True if forced by the caller, if either state carries a pending resync,
/// or if the class's zones differ byte-wise.
pub fn needs_update(
    current: &LightingState,
    last: &LightingState,
    range: ZoneRange,
    force: bool,
) -> bool {
    force || last.force_update || current.force_update || current.range_differs(last, range)
}

/// Activation report to follow a colour update, if any.
///
/// `Some(false)` switches the lighting off, `Some(true)` on.
pub fn activation_change(was_dark: bool, is_dark: bool, force: bool) -> Option<bool> {
    if is_dark {
        Some(false)
    } else if was_dark || force {
        Some(true)
    } else {
        None
    }
}

/// Bring the device's lighting in line with its profile's selected mode.
///
/// Inactive devices and unchanged lighting are successful no-ops with no
/// reports sent. Any transport failure aborts immediately and leaves
/// `last_light` untouched, so the next call retries the whole update.
pub fn synchronize(device: &mut DeviceHandle, force: bool) -> Result<()> {
    if !device.active {
        trace!(device = %device.info.model, "Device inactive, skipping sync");
        return Ok(());
    }

    let (protocol, transport, current, last) = device.sync_parts();
    let range = protocol.zone_range();

    if !needs_update(current, last, range, force) {
        trace!("Lighting unchanged");
        return Ok(());
    }
    last.force_update = false;
    current.force_update = false;

    let update = protocol.encode_update(current)?;
    let was_dark = last.is_dark(range);
    let is_dark = current.is_dark(range);

    transport::send(transport, &update)?;
    if let Some(on) = activation_change(was_dark, is_dark, force) {
        transport::send(transport, &protocol.encode_activation(on))?;
    }

    // Whole snapshot, not just this class's range.
    last.clone_from(current);
    debug!(was_dark, is_dark, force, "Lighting synchronized");
    Ok(())
}
