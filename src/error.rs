use thiserror::Error;

/// Status code returned by the C entry points on success.
pub const SUCCESS: i32 = 0;

/// Error type for Just Voice operations.
///
/// Every variant except [`JvError::BufferSizeMismatch`] and [`JvError::Unknown`]
/// corresponds to one status code of the C API. Use [`JvError::code`] to obtain it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JvError {
    #[error("Handle was not created")]
    NotCreated,
    #[error("Handle was not set up")]
    NotInitialized,
    #[error("Handle was already created")]
    AlreadyCreated,
    #[error("Handle was already set up")]
    AlreadyInitialized,
    #[error("Required pointer is null")]
    NullException,
    #[error("Failed to allocate memory")]
    AllocationFailed,
    #[error("Number of input channels is not supported")]
    NotSupportedNumInputChannels,
    #[error("Number of output channels is not supported")]
    NotSupportedNumOutputChannels,
    #[error("Sample rate is not supported")]
    NotSupportedSampleRate,
    #[error("Samples per block is not supported")]
    NotSupportedSamplesPerBlock,
    #[error("Noise reduction intensity is not supported")]
    NotSupportedIntensity,
    /// Raised by the slice based Rust API only.
    #[error("Buffer holds {actual} samples, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
    #[error("Unknown error code: {0}")]
    Unknown(i32),
}

impl JvError {
    /// Returns the numeric status code of this error.
    pub fn code(&self) -> i32 {
        match self {
            JvError::NotCreated => 1,
            JvError::NotInitialized => 2,
            JvError::AlreadyCreated => 3,
            JvError::AlreadyInitialized => 4,
            JvError::NullException => 5,
            JvError::AllocationFailed => 6,
            JvError::NotSupportedNumInputChannels => 7,
            JvError::NotSupportedNumOutputChannels => 8,
            JvError::NotSupportedSampleRate => 9,
            JvError::NotSupportedSamplesPerBlock => 10,
            JvError::NotSupportedIntensity => 11,
            JvError::BufferSizeMismatch { .. } => 12,
            JvError::Unknown(code) => *code,
        }
    }
}

impl From<i32> for JvError {
    fn from(error_code: i32) -> Self {
        match error_code {
            1 => JvError::NotCreated,
            2 => JvError::NotInitialized,
            3 => JvError::AlreadyCreated,
            4 => JvError::AlreadyInitialized,
            5 => JvError::NullException,
            6 => JvError::AllocationFailed,
            7 => JvError::NotSupportedNumInputChannels,
            8 => JvError::NotSupportedNumOutputChannels,
            9 => JvError::NotSupportedSampleRate,
            10 => JvError::NotSupportedSamplesPerBlock,
            11 => JvError::NotSupportedIntensity,
            code => JvError::Unknown(code),
        }
    }
}

impl From<std::collections::TryReserveError> for JvError {
    fn from(_: std::collections::TryReserveError) -> Self {
        JvError::AllocationFailed
    }
}

/// Converts a C status code into a `Result`.
pub fn result_from_code(error_code: i32) -> Result<(), JvError> {
    match error_code {
        SUCCESS => Ok(()),
        code => Err(JvError::from(code)),
    }
}

/// Converts a `Result` into the C status code.
pub fn code_from_result<T>(result: &Result<T, JvError>) -> i32 {
    match result {
        Ok(_) => SUCCESS,
        Err(err) => err.code(),
    }
}
