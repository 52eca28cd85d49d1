//! Error handling for pwmfan
//!
//! A single error type shared by the fan core, the configuration layer and
//! the fantest tooling. Built on thiserror like the rest of the workspace.

use std::io;
use std::path::PathBuf;

/// Result type alias using PwmFanError
pub type Result<T> = std::result::Result<T, PwmFanError>;

/// Which file operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Write,
}

impl std::fmt::Display for FileOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOp::Read => write!(f, "read"),
            FileOp::Write => write!(f, "write"),
        }
    }
}

/// Error type for all pwmfan operations
#[derive(thiserror::Error, Debug)]
pub enum PwmFanError {
    // ============================================================================
    // Argument Errors
    // ============================================================================
    #[error("Invalid PWM value: {value} (must be 0-255)")]
    InvalidArgument {
        value: i32,
    },

    #[error("Invalid normalized speed: {value} (must be a finite number)")]
    InvalidNormalized {
        value: f64,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("Failed to {op} {path}: {source}")]
    Io {
        path: PathBuf,
        op: FileOp,
        source: io::Error,
    },

    #[error("Failed to parse '{content}' from {path}")]
    Parse {
        path: PathBuf,
        content: String,
    },

    // ============================================================================
    // Control Lifecycle Errors
    // ============================================================================
    #[error("Fan {path} is already under manual control")]
    AlreadyControlled {
        path: PathBuf,
    },

    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PwmFanError {
    /// Create an I/O error for a failed read of `path`
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            op: FileOp::Read,
            source,
        }
    }

    /// Create an I/O error for a failed write to `path`
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            op: FileOp::Write,
            source,
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for failures of the underlying file interface, including
    /// files whose content is not a number.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }

    /// True when a requested duty cycle or speed was rejected
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. } | Self::InvalidNormalized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PwmFanError::InvalidArgument { value: 256 };
        assert_eq!(err.to_string(), "Invalid PWM value: 256 (must be 0-255)");

        let err = PwmFanError::read(
            "/sys/class/hwmon/hwmon0/pwm2",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "Failed to read /sys/class/hwmon/hwmon0/pwm2: gone");

        let err = PwmFanError::invalid_config("pwm_line_start", "must not exceed pwm_line_end");
        assert!(err.to_string().contains("pwm_line_start"));
    }

    #[test]
    fn test_error_classification() {
        let io_err = PwmFanError::write("pwm1", io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(io_err.is_io());
        assert!(!io_err.is_invalid_argument());

        let parse_err = PwmFanError::Parse { path: "pwm1".into(), content: "abc".into() };
        assert!(parse_err.is_io());

        let arg_err = PwmFanError::InvalidArgument { value: -1 };
        assert!(arg_err.is_invalid_argument());

        let nan_err = PwmFanError::InvalidNormalized { value: f64::NAN };
        assert!(nan_err.is_invalid_argument());
        assert!(!nan_err.is_io());
        assert!(!arg_err.is_io());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PwmFanError = json_err.into();
        assert!(matches!(err, PwmFanError::Json(_)));
    }
}
