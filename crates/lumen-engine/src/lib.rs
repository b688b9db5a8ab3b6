//! Lumen engine crate.
//!
//! The mesh-lighting pipeline (normal synthesis, shader program building,
//! attribute layout, lighting uniforms) plus the window and GPU runtime the
//! demo programs run on.

pub mod config;
pub mod core;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod mesh;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;
