//! Configuration bundled for one demo program.

use crate::device::GpuInit;
use crate::diagnostics::Diagnostics;
use crate::logging::LoggingConfig;
use crate::window::RuntimeConfig;

/// Everything a demo program passes to [`Runtime::launch`](crate::window::Runtime::launch).
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub logging: LoggingConfig,
    /// Report shader build failures and GPU errors instead of degrading silently.
    pub diagnostics: bool,
}

impl DemoConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            runtime: RuntimeConfig {
                title: title.into(),
                ..RuntimeConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(self.diagnostics)
    }

    /// GPU parameters with the diagnostics mode applied.
    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            diagnostics: self.diagnostics(),
            ..self.gpu.clone()
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            gpu: GpuInit::default(),
            logging: LoggingConfig::default(),
            diagnostics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_window() {
        let config = DemoConfig::new("cube");
        assert_eq!(config.runtime.title, "cube");
        assert_eq!(config.runtime.initial_size.width, 800.0);
        assert_eq!(config.runtime.initial_size.height, 800.0);
        assert!(!config.runtime.resizable);
        assert!(config.diagnostics().is_enabled());
    }

    #[test]
    fn diagnostics_can_be_turned_off() {
        let config = DemoConfig::new("quiet").with_diagnostics(false);
        assert!(!config.diagnostics().is_enabled());
        assert!(!config.gpu_init().diagnostics.is_enabled());
    }

    #[test]
    fn gpu_reports_errors_by_default() {
        assert!(DemoConfig::new("cube").gpu_init().diagnostics.is_enabled());
    }
}
