//! Safety layer: validates report parameters before anything reaches the device.
//!
//! Lighting reports carry raw zone numbers and counts. A value that does not fit
//! the packet layout would either be silently truncated or address a storage
//! slot the device does not have, so every encoder checks here first.
//!
//! ## Colour updates
//! - **Zone count**: 1 – 15 entries (`(64 - 4) / 4`)
//!
//! ## Stored zones
//! - **Zone number**: 1 – 240. The slot byte is `0x10 + zone - 1` and must fit a `u8`.
//! - Zone numbers are additionally bounds-checked against the device class's range
//!   before a save or load starts.

use crate::error::{Error, Result};
use crate::lighting::ZoneRange;
use crate::packet::{commands, HEADER_LEN, REPORT_LEN, ZONE_ENTRY_LEN};

/// Maximum number of zone entries a single colour update can carry.
pub const MAX_UPDATE_ZONES: usize = (REPORT_LEN - HEADER_LEN) / ZONE_ENTRY_LEN;

/// Highest zone number addressable by a stored-zone slot byte.
pub const MAX_STORED_ZONE: u8 = u8::MAX - commands::ZONE_SLOT_BASE + 1;

/// Validate that a colour update for `count` zones fits one report.
pub fn validate_update_zone_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_UPDATE_ZONES {
        return Err(Error::OutOfRange {
            field: "zone_count",
            value: count as u32,
            min: 1,
            max: MAX_UPDATE_ZONES as u32,
        });
    }
    Ok(())
}

/// Validate a 1-based stored zone number.
pub fn validate_stored_zone(zone: u8) -> Result<()> {
    if zone == 0 || zone > MAX_STORED_ZONE {
        return Err(Error::OutOfRange {
            field: "zone",
            value: zone as u32,
            min: 1,
            max: MAX_STORED_ZONE as u32,
        });
    }
    Ok(())
}

/// Validate a 1-based zone number against a device class's range.
pub fn validate_zone_in_range(zone: u8, range: ZoneRange) -> Result<()> {
    if range.absolute(zone).is_none() {
        return Err(Error::OutOfRange {
            field: "zone",
            value: zone as u32,
            min: 1,
            max: range.count as u32,
        });
    }
    Ok(())
}
