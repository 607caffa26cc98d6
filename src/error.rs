//! Error types for kaleido.
//!
//! The engine itself never fails: bad numeric input degrades to a skipped draw
//! or a default value. Errors only exist at the edges, where names and colors
//! are parsed from the command line and where the window and GPU are brought up.

use std::fmt;

/// Errors produced while parsing configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Pattern mode name not recognized.
    UnknownMode(String),
    /// Particle shape name not recognized.
    UnknownShape(String),
    /// Color scheme name not recognized.
    UnknownScheme(String),
    /// Color string is not `#RRGGBB` or `#RGB`.
    InvalidColor(String),
    /// A flag expected a number.
    InvalidNumber {
        /// Flag that received the value.
        flag: String,
        /// The rejected value.
        value: String,
    },
    /// A flag was given without its value.
    MissingValue(String),
    /// Unrecognized command-line argument.
    UnknownArgument(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownMode(name) => write!(f, "Unknown pattern mode '{}'", name),
            ConfigError::UnknownShape(name) => write!(f, "Unknown particle shape '{}'", name),
            ConfigError::UnknownScheme(name) => write!(f, "Unknown color scheme '{}'", name),
            ConfigError::InvalidColor(value) => {
                write!(f, "Invalid color '{}': expected #RRGGBB or #RGB", value)
            }
            ConfigError::InvalidNumber { flag, value } => {
                write!(f, "Invalid number '{}' for {}", value, flag)
            }
            ConfigError::MissingValue(flag) => write!(f, "Missing value for {}", flag),
            ConfigError::UnknownArgument(arg) => write!(f, "Unknown argument '{}'", arg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the windowed front end.
#[derive(Debug)]
pub enum RunError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            RunError::Window(e) => write!(f, "Failed to create window: {}", e),
            RunError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::EventLoop(e) => Some(e),
            RunError::Window(e) => Some(e),
            RunError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for RunError {
    fn from(e: winit::error::EventLoopError) -> Self {
        RunError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for RunError {
    fn from(e: winit::error::OsError) -> Self {
        RunError::Window(e)
    }
}

impl From<GpuError> for RunError {
    fn from(e: GpuError) -> Self {
        RunError::Gpu(e)
    }
}
