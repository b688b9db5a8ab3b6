use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime.
///
/// `on_start` runs once after the window and GPU exist, `on_frame` once per
/// rendered frame, `on_exit` once when the loop ends, while the GPU is still alive.
pub trait App {
    /// Builds GPU resources. An error here is fatal.
    fn on_start(&mut self, ctx: &StartCtx<'_, '_>) -> anyhow::Result<()>;

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Releases GPU resources.
    fn on_exit(&mut self) {}
}
