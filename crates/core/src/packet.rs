//! Lighting report encoding and decoding.
//!
//! Every report is a fixed 64-byte buffer. The first 4 bytes are a command
//! header; the rest is command-specific payload, zero padded.
//!
//! Mouse lighting commands:
//! - Colour update:  `07 22 04 01 (zone r g b)*`
//! - Activation:     `07 05 02 00 on`
//! - Zone store:     `07 13 slot 01 r g b`
//! - Zone read:      `0E 13 slot 01`, reply echoes the header then `r g b`
//!
//! `slot` addresses the stored zone: `0x10` for zone 1, `0x11` for zone 2, ...

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::safety;
use std::fmt;

/// Total report length.
pub const REPORT_LEN: usize = 64;
/// Command header length.
pub const HEADER_LEN: usize = 4;
/// Bytes per zone entry in a colour update (`zone r g b`).
pub const ZONE_ENTRY_LEN: usize = 4;

/// Well-known command bytes.
pub mod commands {
    /// Write direction (host to device).
    pub const WRITE: u8 = 0x07;
    /// Read direction (device answers).
    pub const READ: u8 = 0x0E;
    /// Live colour update header.
    pub const COLOR_UPDATE: [u8; 4] = [WRITE, 0x22, 0x04, 0x01];
    /// Lighting on/off header.
    pub const ACTIVATION: [u8; 4] = [WRITE, 0x05, 0x02, 0x00];
    /// Stored zone colour sub-command.
    pub const ZONE_STORE: u8 = 0x13;
    /// Slot byte of stored zone 1.
    pub const ZONE_SLOT_BASE: u8 = 0x10;
    /// Trailing byte of the stored zone header.
    pub const ZONE_STORE_TAIL: u8 = 0x01;
}

/// A fixed-size HID report.
#[derive(Clone, PartialEq, Eq)]
pub struct Report([u8; REPORT_LEN]);

impl Report {
    /// Build a report from a header, payload zero padded.
    pub fn with_header(header: [u8; HEADER_LEN]) -> Self {
        let mut buf = [0u8; REPORT_LEN];
        buf[..HEADER_LEN].copy_from_slice(&header);
        Self(buf)
    }

    /// Copy raw bytes into a report.
    ///
    /// Short input is zero padded; input longer than a report is rejected, as is
    /// anything shorter than a header.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN || data.len() > REPORT_LEN {
            return Err(Error::MalformedReport(format!(
                "bad report length: {} bytes (expected {}..={})",
                data.len(),
                HEADER_LEN,
                REPORT_LEN
            )));
        }
        let mut buf = [0u8; REPORT_LEN];
        buf[..data.len()].copy_from_slice(data);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.0
    }

    /// The 4-byte command header.
    pub fn header(&self) -> [u8; HEADER_LEN] {
        let mut h = [0u8; HEADER_LEN];
        h.copy_from_slice(&self.0[..HEADER_LEN]);
        h
    }

    /// Everything after the header.
    pub fn payload(&self) -> &[u8] {
        &self.0[HEADER_LEN..]
    }

    fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.0[HEADER_LEN..]
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Trailing padding is noise in logs.
        let used = self.0.iter().rposition(|&b| b != 0).map_or(HEADER_LEN, |i| {
            (i + 1).max(HEADER_LEN)
        });
        write!(f, "Report({:02X?}", &self.0[..used])?;
        if used < REPORT_LEN {
            write!(f, " +{} zero", REPORT_LEN - used)?;
        }
        write!(f, ")")
    }
}

/// One `(zone, r, g, b)` entry of a colour update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneEntry {
    /// 1-based zone number.
    pub zone: u8,
    pub color: Rgb,
}

/// Live colour update for every zone of a device class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorUpdate {
    pub entries: Vec<ZoneEntry>,
}

impl ColorUpdate {
    /// Entries numbered 1.. in the order of `colors`.
    pub fn from_colors(colors: &[Rgb]) -> Self {
        let entries = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| ZoneEntry {
                zone: (i + 1) as u8,
                color,
            })
            .collect();
        Self { entries }
    }

    pub fn encode(&self) -> Result<Report> {
        safety::validate_update_zone_count(self.entries.len())?;
        let mut report = Report::with_header(commands::COLOR_UPDATE);
        for (entry, chunk) in self
            .entries
            .iter()
            .zip(report.payload_mut().chunks_exact_mut(ZONE_ENTRY_LEN))
        {
            chunk[0] = entry.zone;
            chunk[1..].copy_from_slice(&entry.color.to_bytes());
        }
        Ok(report)
    }
}

/// Switch the device's lighting hardware on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub on: bool,
}

impl Activation {
    pub fn encode(&self) -> Report {
        let mut report = Report::with_header(commands::ACTIVATION);
        report.payload_mut()[0] = u8::from(self.on);
        report
    }
}

/// Header shared by stored-zone writes and reads.
fn zone_store_header(direction: u8, zone: u8) -> Result<[u8; HEADER_LEN]> {
    safety::validate_stored_zone(zone)?;
    Ok([
        direction,
        commands::ZONE_STORE,
        commands::ZONE_SLOT_BASE + (zone - 1),
        commands::ZONE_STORE_TAIL,
    ])
}

/// Persist one zone's colour to device storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneWrite {
    pub zone: u8,
    pub color: Rgb,
}

impl ZoneWrite {
    pub fn encode(&self) -> Result<Report> {
        let mut report = Report::with_header(zone_store_header(commands::WRITE, self.zone)?);
        report.payload_mut()[..3].copy_from_slice(&self.color.to_bytes());
        Ok(report)
    }

    /// Decode a stored-zone write, as a device would on receipt.
    pub fn decode(report: &Report) -> Option<Self> {
        let zone = stored_zone_of(report, commands::WRITE)?;
        let p = report.payload();
        Some(Self {
            zone,
            color: Rgb::from_bytes([p[0], p[1], p[2]]),
        })
    }
}

/// Request one zone's stored colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneRead {
    pub zone: u8,
}

impl ZoneRead {
    pub fn encode(&self) -> Result<Report> {
        Ok(Report::with_header(zone_store_header(
            commands::READ,
            self.zone,
        )?))
    }

    /// Decode a stored-zone read request.
    pub fn decode(report: &Report) -> Option<Self> {
        stored_zone_of(report, commands::READ).map(|zone| Self { zone })
    }
}

/// Zone number addressed by a stored-zone header, if the report is one.
fn stored_zone_of(report: &Report, direction: u8) -> Option<u8> {
    let [dir, cmd, slot, tail] = report.header();
    if dir != direction
        || cmd != commands::ZONE_STORE
        || tail != commands::ZONE_STORE_TAIL
        || slot < commands::ZONE_SLOT_BASE
    {
        return None;
    }
    Some(slot - commands::ZONE_SLOT_BASE + 1)
}

/// Device answer to a [`ZoneRead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneReadReply {
    pub header: [u8; HEADER_LEN],
    pub color: Rgb,
}

impl ZoneReadReply {
    pub fn decode(report: &Report) -> Self {
        let p = report.payload();
        Self {
            header: report.header(),
            color: Rgb::from_bytes([p[0], p[1], p[2]]),
        }
    }

    /// Build the reply a device sends for `request`.
    pub fn encode(request: &Report, color: Rgb) -> Report {
        let mut report = Report::with_header(request.header());
        report.payload_mut()[..3].copy_from_slice(&color.to_bytes());
        report
    }
}
