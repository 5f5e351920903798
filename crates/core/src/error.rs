//! Error types for hidlight-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying report send/receive did not complete.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The device answered with a header that does not echo the request.
    #[error(
        "protocol mismatch on zone {zone}: expected header {expected:02X?}, got {actual:02X?}"
    )]
    ProtocolMismatch {
        zone: u8,
        expected: [u8; 4],
        actual: [u8; 4],
    },

    /// A report that cannot be a valid frame, such as a truncated reply.
    #[error("malformed report: {0}")]
    MalformedReport(String),

    /// Device not found during lookup.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Permission denied opening or writing the device node.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Operation timed out waiting for the device.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Value out of the range the packet layout can carry.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Profile serialization/deserialization error.
    #[error("profile error: {0}")]
    Profile(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
