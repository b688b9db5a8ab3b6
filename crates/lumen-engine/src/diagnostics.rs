//! Optional GPU error reporting.
//!
//! When enabled, tagged sections run inside wgpu error scopes and every error
//! captured there is logged as a [`RuntimeError`]. Errors are reported, never
//! fatal. When disabled nothing is pushed and nothing is reported; errors that
//! escape every scope go to the handler set by [`Diagnostics::install`].

use std::fmt;
use std::sync::Arc;

/// Category of a captured GPU error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorCode {
    Validation,
    OutOfMemory,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::OutOfMemory => "out of memory",
            Self::Internal => "internal",
        })
    }
}

/// A GPU error captured at a tagged call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub code: ErrorCode,
    pub call_site: &'static str,
    pub message: String,
}

impl RuntimeError {
    fn from_wgpu(err: wgpu::Error, call_site: &'static str) -> Self {
        let code = match &err {
            wgpu::Error::Validation { .. } => ErrorCode::Validation,
            wgpu::Error::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            wgpu::Error::Internal { .. } => ErrorCode::Internal,
        };
        Self {
            code,
            call_site,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} error: {}", self.call_site, self.code, self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Diagnostic mode toggle.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Diagnostics {
    enabled: bool,
}

// Pop order is the reverse of this.
const FILTERS: [wgpu::ErrorFilter; 3] = [
    wgpu::ErrorFilter::OutOfMemory,
    wgpu::ErrorFilter::Internal,
    wgpu::ErrorFilter::Validation,
];

/// Runs `f` inside one scope per filter and returns whatever the scopes caught.
pub(crate) fn scoped<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Vec<wgpu::Error>) {
    let guards: Vec<_> = FILTERS
        .iter()
        .map(|&filter| device.push_error_scope(filter))
        .collect();

    let value = f();

    let errors = guards
        .into_iter()
        .rev()
        .filter_map(|guard| pollster::block_on(guard.pop()))
        .collect();
    (value, errors)
}

impl Diagnostics {
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    pub const fn disabled() -> Self {
        Self { enabled: false }
    }

    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Routes errors raised outside any checkpoint.
    ///
    /// Enabled: logged at warn. Disabled: dropped.
    pub fn install(self, device: &wgpu::Device) {
        let enabled = self.enabled;
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            if enabled {
                log::warn!("[uncaptured] {err}");
            }
        }));
    }

    /// Runs `f` as the section tagged `call_site` and drains the errors it raised.
    pub fn checked<T>(
        self,
        device: &wgpu::Device,
        call_site: &'static str,
        f: impl FnOnce() -> T,
    ) -> (T, Vec<RuntimeError>) {
        if !self.enabled {
            return (f(), Vec::new());
        }

        log::debug!("checkpoint: {call_site}");
        let (value, raw) = scoped(device, f);

        let errors: Vec<_> = raw
            .into_iter()
            .map(|err| RuntimeError::from_wgpu(err, call_site))
            .collect();
        for err in &errors {
            log::warn!("{err}");
        }

        (value, errors)
    }

    /// Finishes `encoder` and submits it as the "submit frame" checkpoint.
    ///
    /// Render and copy pass validation happens at `finish`, so draw errors surface here.
    pub fn submit(
        self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: wgpu::CommandEncoder,
    ) -> Vec<RuntimeError> {
        let ((), errors) = self.checked(device, "submit frame", || {
            queue.submit(std::iter::once(encoder.finish()));
        });
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing;

    fn invalid_buffer(device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("map-read vertex buffer"),
            size: 16,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        })
    }

    #[test]
    fn default_is_disabled() {
        assert!(!Diagnostics::default().is_enabled());
        assert_eq!(Diagnostics::new(true), Diagnostics::enabled());
    }

    #[test]
    fn runtime_error_names_its_call_site() {
        let err = RuntimeError {
            code: ErrorCode::Validation,
            call_site: "vertex buffers",
            message: "buffer too small".into(),
        };
        assert_eq!(err.to_string(), "[vertex buffers] validation error: buffer too small");
    }

    #[test]
    fn checkpoint_reports_validation_error_at_its_call_site() {
        let (device, _queue) = testing::device();
        let (_buffer, errors) =
            Diagnostics::enabled().checked(&device, "vertex buffers", || invalid_buffer(&device));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::Validation);
        assert_eq!(errors[0].call_site, "vertex buffers");
    }

    #[test]
    fn clean_checkpoint_reports_nothing() {
        let (device, _queue) = testing::device();
        let ((), errors) = Diagnostics::enabled().checked(&device, "noop", || {});
        assert!(errors.is_empty());
    }

    #[test]
    fn disabled_mode_drops_errors_quietly() {
        let (device, _queue) = testing::device();
        let diagnostics = Diagnostics::disabled();
        diagnostics.install(&device);

        let (_buffer, errors) =
            diagnostics.checked(&device, "vertex buffers", || invalid_buffer(&device));
        assert!(errors.is_empty());
    }
}
