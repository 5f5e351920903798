//! HID transport abstraction for device communication.
//!
//! Provides a trait-based transport layer so that real HID devices and
//! simulated devices share the same interface. The transport owns timeouts
//! and error mapping; callers treat any `Err` as a transport failure.

use crate::error::Result;
use crate::packet::Report;
use std::sync::Arc;
use tracing::trace;

/// Abstraction over raw HID report exchange.
pub trait HidTransport: Send {
    /// Write one report. No reply is expected.
    fn send_report(&self, report: &Report) -> Result<()>;

    /// Write one report and return the device's reply.
    fn exchange_report(&self, report: &Report) -> Result<Report>;
}

impl<T: HidTransport + Sync + ?Sized> HidTransport for Arc<T> {
    fn send_report(&self, report: &Report) -> Result<()> {
        (**self).send_report(report)
    }

    fn exchange_report(&self, report: &Report) -> Result<Report> {
        (**self).exchange_report(report)
    }
}

/// Send a report, tracing the bytes.
pub fn send(transport: &dyn HidTransport, report: &Report) -> Result<()> {
    trace!(report = ?report, "TX");
    transport.send_report(report)
}

/// Send a report and return the reply, tracing both directions.
pub fn exchange(transport: &dyn HidTransport, report: &Report) -> Result<Report> {
    trace!(report = ?report, "TX");
    let reply = transport.exchange_report(report)?;
    trace!(report = ?reply, "RX");
    Ok(reply)
}
