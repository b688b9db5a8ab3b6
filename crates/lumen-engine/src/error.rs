//! Start-up failure taxonomy and process exit codes.

use std::fmt;

/// Fatal start-up failure. Each variant maps to a distinct process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Platform event loop could not be created.
    Platform(String),
    /// Window creation failed.
    Window(String),
    /// No usable GPU surface, adapter or device.
    GpuLoad(String),
    /// The application failed to create its GPU resources.
    Resources(String),
}

impl InitError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Platform(_) => 1,
            Self::Window(_) => 2,
            Self::GpuLoad(_) => 3,
            Self::Resources(_) => 4,
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform(msg) => write!(f, "failed to initialize platform: {msg}"),
            Self::Window(msg) => write!(f, "failed to create window: {msg}"),
            Self::GpuLoad(msg) => write!(f, "failed to initialize GPU: {msg}"),
            Self::Resources(msg) => write!(f, "failed to create GPU resources: {msg}"),
        }
    }
}

impl std::error::Error for InitError {}

/// Exit code of a run that failed after start-up, e.g. the event loop erroring out.
pub const RUNTIME_FAILURE: u8 = 5;

/// Exit code for a failed run: the code of the first [`InitError`] found, else
/// [`RUNTIME_FAILURE`].
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<InitError>()
        .or_else(|| err.chain().find_map(|e| e.downcast_ref::<InitError>()))
        .map_or(RUNTIME_FAILURE, InitError::exit_code)
}
