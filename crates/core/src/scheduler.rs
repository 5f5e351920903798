//! Periodic synchronization of many devices.
//!
//! Each device is synchronized under its own lock for the whole call, so
//! operations on one handle never interleave. Distinct devices are serviced
//! in parallel. A failed sync is not retried within a tick; the next tick is
//! the retry.

use crate::comm::{DeviceStatus, ErrorClass};
use crate::device::{DeviceHandle, SharedDevice};
use crate::error::{Error, Result};
use crate::sync::synchronize;
use std::sync::{Arc, MutexGuard, PoisonError};
use std::thread;
use tracing::{debug, info, warn};

/// What happened to one device during a tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// Synchronize returned success (including "nothing to do").
    Synchronized,
    /// The handle is inactive and was not touched.
    Inactive,
    /// Synchronize failed.
    Failed { class: ErrorClass, error: Error },
}

impl TickOutcome {
    pub fn status(&self) -> Option<DeviceStatus> {
        match self {
            Self::Synchronized => Some(DeviceStatus::Connected),
            Self::Inactive => None,
            Self::Failed { class, .. } => Some(DeviceStatus::from_class(*class)),
        }
    }
}

/// Per-device result of a tick.
#[derive(Debug)]
pub struct TickReport {
    /// Model name and device path.
    pub device: String,
    pub outcome: TickOutcome,
}

/// Holds attached devices and synchronizes them on demand.
#[derive(Default)]
pub struct SyncScheduler {
    devices: Vec<SharedDevice>,
}

impl SyncScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly attached device and return its shared handle.
    pub fn attach(&mut self, device: DeviceHandle) -> SharedDevice {
        info!(device = %device.info.model, "Device attached");
        let shared = device.into_shared();
        self.devices.push(Arc::clone(&shared));
        shared
    }

    /// Drop a device. Returns false if it was not registered.
    pub fn detach(&mut self, device: &SharedDevice) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| !Arc::ptr_eq(d, device));
        before != self.devices.len()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Synchronize every device once, in parallel.
    pub fn tick(&self, force: bool) -> Vec<TickReport> {
        thread::scope(|scope| {
            let workers: Vec<_> = self
                .devices
                .iter()
                .map(|device| scope.spawn(move || sync_one(device, force)))
                .collect();
            workers
                .into_iter()
                .map(|worker| {
                    worker.join().unwrap_or_else(|_| TickReport {
                        device: "<unknown>".to_string(),
                        outcome: TickOutcome::Failed {
                            class: ErrorClass::Transient,
                            error: Error::Transport("sync worker panicked".to_string()),
                        },
                    })
                })
                .collect()
        })
    }
}

/// Lock a device, recovering from a poisoned lock.
///
/// `last_light` is only written after a complete sync, so a panicked holder
/// cannot leave it half-updated.
pub fn lock_device(device: &SharedDevice) -> MutexGuard<'_, DeviceHandle> {
    device.lock().unwrap_or_else(PoisonError::into_inner)
}

fn sync_one(device: &SharedDevice, force: bool) -> TickReport {
    let mut handle = lock_device(device);
    let name = describe(&handle);

    if !handle.active {
        return TickReport {
            device: name,
            outcome: TickOutcome::Inactive,
        };
    }

    let outcome = match synchronize(&mut handle, force) {
        Ok(()) => {
            debug!(device = %name, "Sync ok");
            TickOutcome::Synchronized
        }
        Err(error) => {
            let class = ErrorClass::classify(&error);
            warn!(device = %name, ?class, %error, "Sync failed");
            if class == ErrorClass::Disconnected {
                info!(device = %name, "Marking device inactive");
                handle.active = false;
            }
            TickOutcome::Failed { class, error }
        }
    };
    TickReport {
        device: name,
        outcome,
    }
}

fn describe(handle: &DeviceHandle) -> String {
    if handle.info.path.is_empty() {
        handle.info.model.name().to_string()
    } else {
        format!("{} ({})", handle.info.model.name(), handle.info.path)
    }
}

/// Synchronize one shared device under its lock.
pub fn synchronize_shared(device: &SharedDevice, force: bool) -> Result<()> {
    synchronize(&mut lock_device(device), force)
}
