//! Lighting state model shared by every device class.
//!
//! A [`LightingState`] is a fixed-length sequence of zone colours covering all
//! device classes at once. Each class owns a [`ZoneRange`] slice of it; the
//! keyboard keys sit at the front and the mouse zones follow.

use crate::color::Rgb;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total number of zone slots in a lighting state.
pub const ZONE_COUNT: usize = 160;

/// Number of hardware key zones at the front of the state.
pub const KEY_ZONE_COUNT: usize = 144;

/// Zone slice owned by the keyboard class.
pub const KEYBOARD_ZONES: ZoneRange = ZoneRange::new(0, KEY_ZONE_COUNT);

/// Zone slice owned by the mouse class.
pub const MOUSE_ZONES: ZoneRange = ZoneRange::new(KEY_ZONE_COUNT, 2);

/// A (start offset, count) slice of the zone sequence belonging to one device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneRange {
    pub offset: usize,
    pub count: usize,
}

impl ZoneRange {
    pub const fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    /// One past the last absolute zone index.
    pub const fn end(&self) -> usize {
        self.offset + self.count
    }

    /// Absolute index of a 1-based zone number within this range.
    pub fn absolute(&self, zone: u8) -> Option<usize> {
        let zone = zone as usize;
        (1..=self.count)
            .contains(&zone)
            .then(|| self.offset + zone - 1)
    }

    /// 1-based zone numbers in ascending order.
    pub fn zone_numbers(&self) -> impl Iterator<Item = u8> {
        // Class ranges are small; larger ranges would not fit a report anyway.
        (1..=self.count).map(|z| z as u8)
    }
}

/// Per-zone colours plus the one-shot force-resync flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SparseLighting", try_from = "SparseLighting")]
pub struct LightingState {
    zones: Vec<Rgb>,
    /// Request a full transmission on the next synchronize, even if nothing changed.
    pub force_update: bool,
}

impl Default for LightingState {
    fn default() -> Self {
        Self::dark()
    }
}

impl LightingState {
    /// Every zone black, no resync requested.
    pub fn dark() -> Self {
        Self {
            zones: vec![Rgb::BLACK; ZONE_COUNT],
            force_update: false,
        }
    }

    /// All zone colours, indexed by absolute zone index.
    pub fn zones(&self) -> &[Rgb] {
        &self.zones
    }

    /// Colour at an absolute zone index.
    pub fn zone(&self, index: usize) -> Option<Rgb> {
        self.zones.get(index).copied()
    }

    /// Set the colour at an absolute zone index.
    pub fn set_zone(&mut self, index: usize, color: Rgb) -> Result<()> {
        let slot = self.zones.get_mut(index).ok_or(Error::OutOfRange {
            field: "zone_index",
            value: index as u32,
            min: 0,
            max: (ZONE_COUNT - 1) as u32,
        })?;
        *slot = color;
        Ok(())
    }

    /// The slice of zones owned by one device class.
    pub fn range(&self, range: ZoneRange) -> &[Rgb] {
        &self.zones[range.offset..range.end()]
    }

    pub fn range_mut(&mut self, range: ZoneRange) -> &mut [Rgb] {
        &mut self.zones[range.offset..range.end()]
    }

    /// Fill a device class's zones with one colour.
    pub fn fill(&mut self, range: ZoneRange, color: Rgb) {
        self.range_mut(range).fill(color);
    }

    /// True when every zone in the range is black.
    pub fn is_dark(&self, range: ZoneRange) -> bool {
        self.range(range).iter().all(Rgb::is_dark)
    }

    /// Byte-wise comparison restricted to one class's zones.
    pub fn range_differs(&self, other: &LightingState, range: ZoneRange) -> bool {
        self.range(range) != other.range(range)
    }

    /// Mark this state for a full resync on the next synchronize.
    pub fn request_resync(&mut self) {
        self.force_update = true;
    }
}

/// On-disk form: only non-black zones, keyed by absolute index.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SparseLighting {
    #[serde(default)]
    zones: BTreeMap<usize, Rgb>,
}

impl From<LightingState> for SparseLighting {
    fn from(state: LightingState) -> Self {
        let zones = state
            .zones
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_dark())
            .map(|(i, c)| (i, *c))
            .collect();
        Self { zones }
    }
}

impl TryFrom<SparseLighting> for LightingState {
    type Error = Error;

    fn try_from(sparse: SparseLighting) -> Result<Self> {
        let mut state = LightingState::dark();
        for (index, color) in sparse.zones {
            state
                .set_zone(index, color)
                .map_err(|e| Error::Profile(format!("zone {index}: {e}")))?;
        }
        Ok(state)
    }
}
