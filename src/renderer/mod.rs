//! WebGPU rendering module
//!
//! Planets are instanced sphere meshes; stars and flow particles are
//! camera-facing discs; labels are billboards textured with a bubble image.

pub mod bubble;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::SceneRenderState;
