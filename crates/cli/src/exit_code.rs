//! Process exit codes
//!
//! Scripts can rely on these values; they only ever grow.

/// Exit status of an `ab` invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Any failure without a more specific code
    GeneralError = 1,
    /// Bad arguments or configuration
    UsageError = 2,
    /// The API could not be reached
    NetworkError = 3,
    /// The API key was rejected or lacks permission
    AuthError = 4,
    NotFound = 5,
}

impl ExitCode {
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map a library error to its exit code
    pub fn from_error(error: &ab_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_core::{Error, ErrorKind};

    #[test]
    fn test_round_trip_codes() {
        for code in 0..=5 {
            assert_eq!(ExitCode::from_i32(code).map(ExitCode::as_i32), Some(code));
        }
        assert_eq!(ExitCode::from_i32(42), None);
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::api(ErrorKind::NotFound, "gone")),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from_error(&Error::api(ErrorKind::Forbidden, "no")),
            ExitCode::AuthError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Network("refused".into())),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from_error(&Error::InvalidInput("bad".into())),
            ExitCode::UsageError
        );
        assert_eq!(
            ExitCode::from_error(&Error::api(ErrorKind::TooManyRequests, "slow down")),
            ExitCode::GeneralError
        );
    }
}
