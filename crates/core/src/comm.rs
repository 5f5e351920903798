//! Error classification for the layers that schedule synchronization.
//!
//! The engine itself never retries. Callers use [`ErrorClass`] to decide
//! what a failure means: try again next tick, give up on a detached device,
//! or report a firmware/protocol problem.

use crate::error::{Error, Result};

/// Classification of lighting errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient transport errors that may succeed next tick (timeout, busy).
    Transient,
    /// Device is disconnected. Stop scheduling it.
    Disconnected,
    /// Permission denied on the device node.
    PermissionDenied,
    /// Device answered, but not with what the protocol promises.
    Protocol,
    /// Bad input from the profile or caller; the device was never touched.
    InvalidInput,
}

impl ErrorClass {
    /// Classify an error for scheduling decisions.
    pub fn classify(err: &Error) -> Self {
        match err {
            Error::Timeout(_) => Self::Transient,
            Error::PermissionDenied(_) => Self::PermissionDenied,
            Error::DeviceNotFound(_) => Self::Disconnected,
            Error::ProtocolMismatch { .. } | Error::MalformedReport(_) => Self::Protocol,
            Error::Transport(msg) => {
                let lower = msg.to_lowercase();
                if lower.contains("disconnect")
                    || lower.contains("not found")
                    || lower.contains("no such device")
                {
                    Self::Disconnected
                } else if lower.contains("permission")
                    || lower.contains("access denied")
                    || lower.contains("access is denied")
                {
                    Self::PermissionDenied
                } else {
                    Self::Transient
                }
            }
            Error::OutOfRange { .. } | Error::Profile(_) => Self::InvalidInput,
        }
    }

    /// Whether the failure came from the transport rather than the protocol.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transient | Self::Disconnected | Self::PermissionDenied
        )
    }

    /// Whether the next scheduled attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// Device connection status for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Last operation succeeded.
    Connected,
    /// Device is not found / disconnected.
    Disconnected,
    /// Permission denied. Needs udev rules or elevated access.
    PermissionError,
    /// Communication error (transient or protocol).
    Error,
}

impl DeviceStatus {
    /// Status implied by the outcome of the last device operation.
    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Connected,
            Err(e) => Self::from_class(ErrorClass::classify(e)),
        }
    }

    /// Status implied by a classified failure.
    pub fn from_class(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Disconnected => Self::Disconnected,
            ErrorClass::PermissionDenied => Self::PermissionError,
            _ => Self::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_timeout_as_transient() {
        let err = Error::Timeout("1s elapsed".into());
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Transient);
        assert!(ErrorClass::classify(&err).is_retryable());
    }

    #[test]
    fn classify_permission_denied() {
        let err = Error::PermissionDenied("access denied".into());
        assert_eq!(ErrorClass::classify(&err), ErrorClass::PermissionDenied);
        assert!(!ErrorClass::classify(&err).is_retryable());
    }

    #[test]
    fn classify_disconnect() {
        let err = Error::DeviceNotFound("M65".into());
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Disconnected);
        assert!(!ErrorClass::classify(&err).is_retryable());
    }

    #[test]
    fn classify_transport_messages() {
        let err = Error::Transport("write: No such device".into());
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Disconnected);
        let err = Error::Transport("Access is denied".into());
        assert_eq!(ErrorClass::classify(&err), ErrorClass::PermissionDenied);
        let err = Error::Transport("pipe error".into());
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Transient);
    }

    #[test]
    fn protocol_mismatch_is_not_transport() {
        let err = Error::ProtocolMismatch {
            zone: 1,
            expected: [0x0E, 0x13, 0x10, 0x01],
            actual: [0x00; 4],
        };
        let class = ErrorClass::classify(&err);
        assert_eq!(class, ErrorClass::Protocol);
        assert!(!class.is_transport());
        assert!(!class.is_retryable());
    }

    #[test]
    fn truncated_reply_is_protocol_error() {
        let err = crate::packet::Report::from_bytes(&[0x0E, 0x13]).unwrap_err();
        let class = ErrorClass::classify(&err);
        assert_eq!(class, ErrorClass::Protocol);
        assert!(!class.is_retryable());
        assert_eq!(DeviceStatus::from_class(class), DeviceStatus::Error);
    }

    #[test]
    fn invalid_input_class() {
        let err = Error::Profile("bad".into());
        assert_eq!(ErrorClass::classify(&err), ErrorClass::InvalidInput);
    }

    #[test]
    fn status_from_result() {
        assert_eq!(DeviceStatus::from_result(&Ok(())), DeviceStatus::Connected);
        let gone: Result<()> = Err(Error::DeviceNotFound("x".into()));
        assert_eq!(DeviceStatus::from_result(&gone), DeviceStatus::Disconnected);
        let denied: Result<()> = Err(Error::PermissionDenied("x".into()));
        assert_eq!(
            DeviceStatus::from_result(&denied),
            DeviceStatus::PermissionError
        );
        let flaky: Result<()> = Err(Error::Timeout("x".into()));
        assert_eq!(DeviceStatus::from_result(&flaky), DeviceStatus::Error);
    }
}
