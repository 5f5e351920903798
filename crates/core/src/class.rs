//! Device class capabilities.
//!
//! Each device class has its own zone geometry and report layout. The sync
//! engine and persistence codec are written once against [`LightingProtocol`].

use crate::color::Rgb;
use crate::error::Result;
use crate::lighting::{LightingState, ZoneRange, MOUSE_ZONES};
use crate::packet::{Activation, ColorUpdate, Report, ZoneRead, ZoneReadReply, ZoneWrite};
use crate::safety;

/// Packet geometry of one device class.
pub trait LightingProtocol: Send + Sync {
    /// Slice of the lighting state this class owns.
    fn zone_range(&self) -> ZoneRange;

    /// Live colour report for every zone in range.
    fn encode_update(&self, state: &LightingState) -> Result<Report>;

    /// Lighting hardware on/off report.
    fn encode_activation(&self, on: bool) -> Report;

    /// Store one zone's colour in device memory. `zone` is 1-based.
    fn encode_save(&self, zone: u8, color: Rgb) -> Result<Report>;

    /// Request one zone's stored colour. `zone` is 1-based.
    fn encode_load(&self, zone: u8) -> Result<Report>;

    /// Split a load reply into its echoed header and the zone colour.
    fn decode_load(&self, reply: &Report) -> ZoneReadReply {
        ZoneReadReply::decode(reply)
    }
}

/// Mouse lighting: two zones, batched live updates, per-zone storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseProtocol;

impl LightingProtocol for MouseProtocol {
    fn zone_range(&self) -> ZoneRange {
        MOUSE_ZONES
    }

    fn encode_update(&self, state: &LightingState) -> Result<Report> {
        ColorUpdate::from_colors(state.range(self.zone_range())).encode()
    }

    fn encode_activation(&self, on: bool) -> Report {
        Activation { on }.encode()
    }

    fn encode_save(&self, zone: u8, color: Rgb) -> Result<Report> {
        safety::validate_zone_in_range(zone, self.zone_range())?;
        ZoneWrite { zone, color }.encode()
    }

    fn encode_load(&self, zone: u8) -> Result<Report> {
        safety::validate_zone_in_range(zone, self.zone_range())?;
        ZoneRead { zone }.encode()
    }
}

/// Family of peripherals sharing one packet layout and zone geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Mouse,
}

impl DeviceClass {
    /// The class's packet geometry.
    pub fn protocol(&self) -> &'static dyn LightingProtocol {
        match self {
            Self::Mouse => &MouseProtocol,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
        }
    }
}
