//! GPU device, surface and depth attachment.
//!
//! Creating the adapter and device here stands in for loading GPU functions:
//! any failure is fatal at start-up.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
