//! Time-driven animation
//!
//! Everything here is a pure function of scene time and seeded per-particle
//! offsets:
//! - No rendering or platform dependencies
//! - Seeded RNG only
//! - Buffer lengths fixed at construction

pub mod flow;
pub mod path;
pub mod sdf;

pub use flow::{EnergyFlow, FlowParticle, fire_color};
pub use path::{FlowPath, PathSample};
pub use sdf::{BubbleShape, sd_bubble, sd_rounded_rect, sd_segment, sd_triangle};
